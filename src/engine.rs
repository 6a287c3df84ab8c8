//! Correction engine: the consumer side of the corruption model.
//!
//! A correction is a 1–3 pass pipeline over the inference collaborator:
//!
//! 1. interpret the garbled text
//! 2. optionally ask the model to review its own interpretation
//! 3. structural validation
//!
//! Any collaborator failure is folded into a rejected outcome with a fallback
//! to the original text; nothing here propagates an error to the caller.

use crate::error::AppError;
use crate::infer::Interpreter;
use crate::validate::{self, ValidatorConfig};

/// System instruction for the interpretation pass.
pub const INTERPRETATION_PROMPT: &str = "\
You interpret garbled/fuzzy typing into what the user intended to write.

The user types VERY fast, so:
- Letters may be transposed (teh → the)
- Letters may be missing (bcause → because)
- Keys may be adjacent wrong keys (wprds → words)
- Words may be run together (onceupon → once upon)
- Words may be split (cre ate → create)
- Words may be completely garbled but sound similar

Your job: Figure out what they MEANT to type.

RULES:
1. Output the interpreted text, nothing else
2. Keep the same meaning and intent
3. Keep roughly the same structure (sentence count)
4. Fix ALL the typing errors
5. Do NOT add new ideas or change the topic
6. Do NOT respond conversationally

Example:
Input: \"once iualpio a time tbere weas a prince\"
Output: \"Once upon a time there was a prince\"

Now interpret this:";

const REVIEW_SYSTEM: &str = "Answer ONLY with REASONABLE or UNREASONABLE.";
const REVIEW_MAX_TOKENS: usize = 20;

/// Engine tuning. The philosophy: trust the model for word-level
/// interpretation, only reject structurally wrong or off-topic output.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum words before attempting interpretation.
    pub min_words: usize,
    /// Minimum characters before attempting interpretation.
    pub min_chars: usize,
    /// Ask the model to verify its own interpretation.
    pub enable_self_review: bool,
    /// Token cap for the interpretation pass.
    pub max_tokens: usize,
    /// Hand back the original text when interpretation fails.
    pub return_original_on_failure: bool,
    pub validator: ValidatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_words: 3,
            min_chars: 10,
            enable_self_review: true,
            max_tokens: 250,
            return_original_on_failure: true,
            validator: ValidatorConfig::default(),
        }
    }
}

impl EngineConfig {
    /// More validation, less hallucination risk.
    pub fn strict() -> Self {
        Self {
            min_words: 4,
            validator: ValidatorConfig {
                length_ratio_max: 1.5,
                length_ratio_min: 0.6,
                ..ValidatorConfig::default()
            },
            ..Self::default()
        }
    }

    /// Default settings.
    pub fn balanced() -> Self {
        Self::default()
    }

    /// Trust the model more; skips the review pass, so it is also faster.
    pub fn lenient() -> Self {
        Self {
            min_words: 2,
            enable_self_review: false,
            validator: ValidatorConfig {
                length_ratio_max: 2.0,
                length_ratio_min: 0.4,
                ..ValidatorConfig::default()
            },
            ..Self::default()
        }
    }
}

/// Outcome of one correction attempt. `text` carries the accepted
/// interpretation on success, or the original text on failure (when
/// `return_original_on_failure` is set).
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionResult {
    pub success: bool,
    pub text: Option<String>,
    pub confidence: f64,
    pub reason: String,
}

pub struct CorrectionEngine<I> {
    interpreter: I,
    config: EngineConfig,
}

impl<I: Interpreter> CorrectionEngine<I> {
    pub fn new(interpreter: I, config: EngineConfig) -> Self {
        Self {
            interpreter,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Interpret fuzzy/garbled typing, falling back to the original text on
    /// any failure. Never returns an error.
    pub fn correct(&self, text: &str) -> CorrectionResult {
        let text = text.trim();

        // Minimum-input guards run before any model call.
        let word_count = text.split_whitespace().count();
        if word_count < self.config.min_words {
            return self.rejected(
                text,
                0.0,
                format!("need {} more words", self.config.min_words - word_count),
            );
        }
        if text.chars().count() < self.config.min_chars {
            return self.rejected(text, 0.0, "need more text");
        }

        let interpreted = match self
            .interpreter
            .generate(INTERPRETATION_PROMPT, text, self.config.max_tokens)
        {
            Ok(out) => out,
            Err(_) => return self.rejected(text, 0.0, "interpretation error"),
        };

        if interpreted.trim().eq_ignore_ascii_case(text) {
            return CorrectionResult {
                success: true,
                text: Some(text.to_string()),
                confidence: 1.0,
                reason: "no changes needed".to_string(),
            };
        }

        if self.config.enable_self_review {
            // A review transport failure is not a verdict; carry on.
            if let Ok(false) = self.review(text, &interpreted) {
                return self.rejected(text, 0.0, "self-review: unreasonable");
            }
        }

        let validation = validate::validate(text, &interpreted, &self.config.validator);
        if validation.is_valid {
            CorrectionResult {
                success: true,
                text: Some(interpreted),
                confidence: validation.confidence,
                reason: validation.reason,
            }
        } else {
            self.rejected(text, validation.confidence, validation.reason)
        }
    }

    fn review(&self, original: &str, interpretation: &str) -> Result<bool, AppError> {
        let prompt = format!(
            "You are checking if an interpretation of garbled typing is reasonable.\n\n\
             ORIGINAL (garbled): {original}\n\n\
             INTERPRETATION: {interpretation}\n\n\
             Is this interpretation REASONABLE? Consider:\n\
             - Does it preserve the apparent meaning/topic?\n\
             - Does it have similar structure (sentence count)?\n\
             - Does it make sense as what someone typing fast might have meant?\n\n\
             Answer ONLY: REASONABLE or UNREASONABLE"
        );
        let response = self
            .interpreter
            .generate(REVIEW_SYSTEM, &prompt, REVIEW_MAX_TOKENS)?;
        Ok(!response.to_uppercase().contains("UNREASONABLE"))
    }

    fn rejected(&self, original: &str, confidence: f64, reason: impl Into<String>) -> CorrectionResult {
        CorrectionResult {
            success: false,
            text: self
                .config
                .return_original_on_failure
                .then(|| original.to_string()),
            confidence,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Scripted stand-in for the model server.
    struct StubModel {
        replies: RefCell<Vec<Result<String, AppError>>>,
        calls: RefCell<usize>,
    }

    impl StubModel {
        fn new(replies: Vec<Result<String, AppError>>) -> Self {
            Self {
                replies: RefCell::new(replies),
                calls: RefCell::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl Interpreter for &StubModel {
        fn generate(&self, _system: &str, _user: &str, _max: usize) -> Result<String, AppError> {
            *self.calls.borrow_mut() += 1;
            let mut replies = self.replies.borrow_mut();
            if replies.is_empty() {
                return Ok(String::new());
            }
            replies.remove(0)
        }
    }

    fn engine(model: &StubModel, config: EngineConfig) -> CorrectionEngine<&StubModel> {
        CorrectionEngine::new(model, config)
    }

    #[test]
    fn too_few_words_short_circuits_without_a_model_call() {
        let model = StubModel::new(vec![]);
        let result = engine(&model, EngineConfig::default()).correct("hello there");
        assert!(!result.success);
        assert_eq!(result.reason, "need 1 more words");
        assert_eq!(result.text.as_deref(), Some("hello there"));
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn too_few_characters_short_circuits() {
        let model = StubModel::new(vec![]);
        let result = engine(&model, EngineConfig::default()).correct("a b c");
        assert!(!result.success);
        assert_eq!(result.reason, "need more text");
        assert_eq!(model.calls(), 0);
    }

    #[test]
    fn model_failure_falls_back_to_the_original() {
        let model = StubModel::new(vec![Err(AppError::failure("connection refused"))]);
        let result =
            engine(&model, EngineConfig::default()).correct("teh qick brown fox jmps");
        assert!(!result.success);
        assert_eq!(result.reason, "interpretation error");
        assert_eq!(result.text.as_deref(), Some("teh qick brown fox jmps"));
    }

    #[test]
    fn unchanged_interpretation_is_a_confident_accept() {
        let model = StubModel::new(vec![Ok("already clean text here".to_string())]);
        let result =
            engine(&model, EngineConfig::default()).correct("already clean text here");
        assert!(result.success);
        assert_eq!(result.reason, "no changes needed");
        assert!((result.confidence - 1.0).abs() < 1e-12);
        assert_eq!(model.calls(), 1, "no review pass for identical output");
    }

    #[test]
    fn review_verdict_unreasonable_rejects() {
        let model = StubModel::new(vec![
            Ok("The quick brown fox jumps".to_string()),
            Ok("UNREASONABLE".to_string()),
        ]);
        let result = engine(&model, EngineConfig::default()).correct("teh qick brown fox jmps");
        assert!(!result.success);
        assert_eq!(result.reason, "self-review: unreasonable");
        assert_eq!(result.text.as_deref(), Some("teh qick brown fox jmps"));
    }

    #[test]
    fn review_transport_error_is_ignored() {
        let model = StubModel::new(vec![
            Ok("The quick brown fox jumps".to_string()),
            Err(AppError::failure("timeout")),
        ]);
        let result = engine(&model, EngineConfig::default()).correct("teh qick brown fox jmps");
        assert!(result.success, "{}", result.reason);
        assert_eq!(result.text.as_deref(), Some("The quick brown fox jumps"));
    }

    #[test]
    fn conversational_interpretation_is_rejected_by_validation() {
        let model = StubModel::new(vec![
            Ok("I'm not sure what you mean by that".to_string()),
            Ok("REASONABLE".to_string()),
        ]);
        let result = engine(&model, EngineConfig::default()).correct("teh qick brown fox jmps");
        assert!(!result.success);
        assert_eq!(result.reason, "conversational response");
        assert_eq!(result.text.as_deref(), Some("teh qick brown fox jmps"));
    }

    #[test]
    fn accepted_interpretation_carries_validator_confidence() {
        let model = StubModel::new(vec![
            Ok("The quick brown fox jumps".to_string()),
            Ok("REASONABLE".to_string()),
        ]);
        let result = engine(&model, EngineConfig::default()).correct("teh qick brown fox jmps");
        assert!(result.success, "{}", result.reason);
        assert_eq!(result.text.as_deref(), Some("The quick brown fox jumps"));
        assert!(result.confidence > 0.5 && result.confidence <= 1.0);
    }

    #[test]
    fn lenient_preset_skips_the_review_pass() {
        let model = StubModel::new(vec![Ok("The quick brown fox jumps".to_string())]);
        let result = engine(&model, EngineConfig::lenient()).correct("teh qick brown fox jmps");
        assert!(result.success, "{}", result.reason);
        assert_eq!(model.calls(), 1);
    }

    #[test]
    fn fallback_text_can_be_disabled() {
        let config = EngineConfig {
            return_original_on_failure: false,
            ..EngineConfig::default()
        };
        let model = StubModel::new(vec![Err(AppError::failure("down"))]);
        let result = engine(&model, config).correct("teh qick brown fox jmps");
        assert!(!result.success);
        assert_eq!(result.text, None);
    }
}
