//! Structural validation of model reconstructions.
//!
//! The model is trusted for word-level interpretation; these checks only
//! reject outputs that are structurally wrong (too long/short, different
//! sentence count, still garbled) or off-task (the model answering
//! conversationally instead of transcribing). Everything here is
//! deterministic and side-effect free.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

/// Structural acceptance thresholds.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Output may be at most this multiple of the input length (abbreviation
    /// expansion legitimately grows text).
    pub length_ratio_max: f64,
    /// Output must be at least this multiple of the input length.
    pub length_ratio_min: f64,
    /// Allowed difference in sentence counts (input punctuation is often
    /// missing).
    pub sentence_tolerance: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            length_ratio_max: 1.8,
            length_ratio_min: 0.5,
            sentence_tolerance: 1,
        }
    }
}

/// Outcome of one validation call. Recomputed per call, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub confidence: f64,
    pub reason: String,
}

impl ValidationResult {
    fn reject(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            confidence: 0.0,
            reason: reason.into(),
        }
    }
}

/// Anchored patterns that indicate the model responded conversationally
/// instead of transcribing. Matched case-insensitively against the start of
/// the candidate.
static DEFLECTION_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"^i'?m not sure",
        r"^i don'?t understand",
        r"^i can'?t",
        r"^sorry",
        r"^please provide",
        r"^what do you mean",
        r"^could you",
        r"^can you",
        r"^it seems like",
        r"^i think you",
        r"^this (text|input|message)",
        r"^the (text|input|message)",
    ])
    .expect("deflection patterns are valid regexes")
});

/// Terminal punctuation runs (one run = one sentence boundary).
static SENTENCE_ENDINGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence-ending pattern is valid"));

/// Fallback sentence markers for punctuation-free text: a capitalized word at
/// the start or after a period.
static CAPITAL_STARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\s+[A-Z]|^\s*[A-Z]").expect("capital-start pattern is valid"));

/// Four or more consecutive consonants forming a whole word chunk ('y' is
/// treated as a vowel here; legitimate words like "rhythm" survive).
static CONSONANT_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[bcdfghjklmnpqrstvwxz]{4,}\b").expect("consonant-run pattern is valid"));

/// Count sentences, tolerating missing punctuation.
pub fn count_sentences(text: &str) -> usize {
    let explicit = SENTENCE_ENDINGS.find_iter(text).count();
    if explicit > 0 {
        return explicit;
    }
    CAPITAL_STARTS.find_iter(text).count().max(1)
}

/// Validate a candidate reconstruction against the original input.
pub fn validate(original: &str, candidate: &str, config: &ValidatorConfig) -> ValidationResult {
    if candidate.trim().is_empty() {
        return ValidationResult::reject("empty output");
    }

    let original = original.trim();
    let candidate = candidate.trim();

    if DEFLECTION_PATTERNS.is_match(&candidate.to_lowercase()) {
        return ValidationResult::reject("conversational response");
    }

    // Empty originals carry no structure to compare against; skip the ratio
    // checks and score length neutrally.
    let ratio = if original.is_empty() {
        None
    } else {
        Some(candidate.chars().count() as f64 / original.chars().count() as f64)
    };

    if let Some(ratio) = ratio {
        if ratio > config.length_ratio_max {
            return ValidationResult::reject(format!("too long ({ratio:.1}x)"));
        }
        if ratio < config.length_ratio_min {
            return ValidationResult::reject(format!("too short ({ratio:.1}x)"));
        }
    }

    let original_sentences = count_sentences(original);
    let candidate_sentences = count_sentences(candidate);
    let diff = original_sentences.abs_diff(candidate_sentences);
    if diff > config.sentence_tolerance {
        return ValidationResult::reject(format!(
            "structure changed ({original_sentences}→{candidate_sentences} sentences)"
        ));
    }

    if CONSONANT_RUNS.find_iter(&candidate.to_lowercase()).count() > 2 {
        return ValidationResult::reject("output still garbled");
    }

    let length_score = match ratio {
        Some(ratio) => (1.0 - (1.0 - ratio).abs() * 0.5).clamp(0.0, 1.0),
        None => 0.5,
    };
    let sentence_score = if diff == 0 { 1.0 } else { 0.7 };

    ValidationResult {
        is_valid: true,
        confidence: (length_score + sentence_score) / 2.0,
        reason: "valid".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(original: &str, candidate: &str) -> ValidationResult {
        validate(original, candidate, &ValidatorConfig::default())
    }

    #[test]
    fn identical_clean_text_passes_with_full_confidence() {
        let result = check(
            "The meeting was rescheduled to Thursday.",
            "The meeting was rescheduled to Thursday.",
        );
        assert!(result.is_valid);
        assert_eq!(result.reason, "valid");
        assert!((result.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_output_is_rejected() {
        let result = check("some garbled text", "   ");
        assert!(!result.is_valid);
        assert_eq!(result.reason, "empty output");
    }

    #[test]
    fn conversational_responses_are_rejected() {
        for candidate in [
            "I'm not sure what you mean",
            "Sorry, could you clarify?",
            "Can you rephrase that?",
            "It seems like you typed something garbled",
            "The text appears to be corrupted",
        ] {
            let result = check("any text", candidate);
            assert!(!result.is_valid, "{candidate:?} should be rejected");
            assert_eq!(result.reason, "conversational response");
        }
    }

    #[test]
    fn deflection_patterns_only_match_at_the_start() {
        let result = check(
            "plz snd th rport and tell me wht u thnk",
            "Please send the report and tell me what you think",
        );
        assert!(result.is_valid, "mid-string 'tell me' is not a deflection");
    }

    #[test]
    fn length_ratio_bounds_are_enforced() {
        let result = check("hello world", "hi");
        assert!(!result.is_valid);
        assert!(result.reason.starts_with("too short"), "{}", result.reason);

        let long = "this output rambles on far longer than the input ever did";
        let result = check("short input text", long);
        assert!(!result.is_valid);
        assert!(result.reason.starts_with("too long"), "{}", result.reason);
    }

    #[test]
    fn sentence_count_changes_beyond_tolerance_are_rejected() {
        let result = check(
            "First do this. Then do that. Finally check everything.",
            "First do this then do that finally check everything and also rewrite it.",
        );
        assert!(!result.is_valid);
        assert!(result.reason.starts_with("structure changed"), "{}", result.reason);
    }

    #[test]
    fn one_sentence_of_drift_is_tolerated_with_reduced_confidence() {
        let result = check(
            "the meeting was rescheduled to thursday",
            "The meeting was rescheduled. See you Thursday.",
        );
        assert!(result.is_valid, "{}", result.reason);
        assert!(result.confidence < 1.0);
    }

    #[test]
    fn garbled_output_is_rejected() {
        let result = check(
            "the quick brown fox jumps over the lazy dog today",
            "the qkwck brwwn fxhj jmps over the lzgy dgqr tdqy",
        );
        assert!(!result.is_valid);
        assert_eq!(result.reason, "output still garbled");
    }

    #[test]
    fn a_couple_of_consonant_clusters_are_fine() {
        // Two clusters is within tolerance (some are legitimate, e.g. "strengths"
        // stripped of vowels by the *input*, not the output).
        let result = check(
            "he brings real strengths and depths to the team every day",
            "he brngs real strngths and depths to the team every day",
        );
        assert!(result.is_valid, "{}", result.reason);
    }

    #[test]
    fn sentence_counting_handles_missing_punctuation() {
        assert_eq!(count_sentences("no punctuation here"), 1);
        assert_eq!(count_sentences("One. Two. Three."), 3);
        assert_eq!(count_sentences("What?! Really?"), 2);
        assert_eq!(count_sentences("Capitalized start without ending"), 1);
    }
}
