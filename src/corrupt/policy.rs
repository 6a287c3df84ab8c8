//! Corruption policy: which operators run, how often, and the safety floor.
//!
//! Word policy: draw `level.operations()` operators by weighted choice and
//! apply them in sequence. Extreme uses its own table biased toward hand
//! shift and vowel drop (the "whole word unrecognizable" patterns) and caps
//! the pass count at two. If the result drops below 40% of the original
//! length, it is discarded and replaced by a single bounded
//! adjacent-substitution pass.
//!
//! Sentence policy: corrupt a level-dependent fraction of the words, then
//! optionally run words together (Heavy/Extreme) or split one (Extreme).

use rand::prelude::*;

use crate::corrupt::{ops, ErrorKind, Severity};

/// Minimum corrupted-word length as a fraction of the original. Below this
/// the word is considered unrecoverable garbage and gets repaired.
const LENGTH_FLOOR: f64 = 0.4;

/// Trigger probability for curated misspellings on matching words.
const MISSPELLING_CHANCE: f64 = 0.6;

/// Probability of merging words at Heavy/Extreme.
const RUN_TOGETHER_CHANCE: f64 = 0.3;

/// Probability of splitting a word at Extreme.
const SPLIT_CHANCE: f64 = 0.2;

/// Weighted operator table for Light/Medium/Heavy.
const GENERIC_OPS: &[(ErrorKind, f64)] = &[
    (ErrorKind::Adjacent, 0.30),
    (ErrorKind::Transpose, 0.25),
    (ErrorKind::Delete, 0.20),
    (ErrorKind::Duplicate, 0.15),
    (ErrorKind::Insert, 0.10),
];

/// Weighted operator table for Extreme: biased toward hand shift and vowel
/// drop to produce heavily garbled but context-decodable words.
const EXTREME_OPS: &[(ErrorKind, f64)] = &[
    (ErrorKind::HandShift, 0.35),
    (ErrorKind::VowelDrop, 0.30),
    (ErrorKind::Adjacent, 0.20),
    (ErrorKind::Transpose, 0.15),
];

/// Result of corrupting one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOutcome {
    pub text: String,
    pub applied: Vec<ErrorKind>,
}

/// Result of corrupting a sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceOutcome {
    pub text: String,
    pub applied: Vec<ErrorKind>,
}

fn apply_operator(
    kind: ErrorKind,
    word: &str,
    level: Severity,
    rng: &mut impl Rng,
) -> (String, bool) {
    match kind {
        ErrorKind::Adjacent => ops::adjacent_substitution(word, level.intensity(), rng),
        ErrorKind::HandShift => ops::hand_shift(word, rng),
        ErrorKind::Transpose => ops::transpose(word, rng),
        ErrorKind::Delete => ops::delete(word, rng),
        ErrorKind::Duplicate => ops::duplicate(word, rng),
        ErrorKind::Insert => ops::insert_adjacent(word, rng),
        ErrorKind::VowelDrop => ops::vowel_drop(word, level.intensity(), rng),
        ErrorKind::Visual => ops::visual_confusion(word, rng),
        ErrorKind::Misspelling => ops::known_misspelling(word, rng),
        ErrorKind::Abbreviation => ops::abbreviate(word),
        // Sentence-level operators are dispatched by `corrupt_sentence`.
        ErrorKind::RunTogether | ErrorKind::Split => (word.to_string(), false),
    }
}

/// Corrupt a single word at the given severity.
///
/// Words shorter than two characters or containing non-alphabetic characters
/// pass through unchanged, so punctuation-bearing tokens keep their shape.
pub fn corrupt_word(word: &str, level: Severity, rng: &mut impl Rng) -> WordOutcome {
    let len = word.chars().count();
    if len < 2 || !word.chars().all(char::is_alphabetic) {
        return WordOutcome {
            text: word.to_string(),
            applied: Vec::new(),
        };
    }

    // Curated misspellings model muscle memory, not the keyboard; they take
    // precedence over the geometric operators when the word matches.
    if crate::corrupt::tables::misspellings_for(&word.to_lowercase()).is_some()
        && rng.gen_bool(MISSPELLING_CHANCE)
    {
        let (text, mutated) = ops::known_misspelling(word, rng);
        if mutated {
            return WordOutcome {
                text,
                applied: vec![ErrorKind::Misspelling],
            };
        }
    }

    let (table, passes) = if level == Severity::Extreme {
        // Four stacked passes destroyed words beyond recovery; two is enough
        // once hand shift is in the mix.
        (EXTREME_OPS, level.operations().min(2))
    } else {
        (GENERIC_OPS, level.operations())
    };

    let mut text = word.to_string();
    let mut applied = Vec::new();

    for _ in 0..passes {
        let Ok(&(kind, _)) = table.choose_weighted(rng, |(_, w)| *w) else {
            break;
        };
        let (next, mutated) = apply_operator(kind, &text, level, rng);
        if mutated {
            text = next;
            if !applied.contains(&kind) {
                applied.push(kind);
            }
        }
    }

    // Safety floor: a word shredded below 40% of its length is unrecoverable
    // even with context. Fall back to one bounded substitution pass.
    if (text.chars().count() as f64) < len as f64 * LENGTH_FLOOR {
        let (repaired, mutated) = ops::adjacent_substitution(word, 0.5, rng);
        text = repaired;
        applied = if mutated {
            vec![ErrorKind::Adjacent]
        } else {
            Vec::new()
        };
    }

    WordOutcome { text, applied }
}

/// Corrupt a sentence at the given severity.
///
/// Selects `max(min_corrupt_words, round(n × word_fraction))` distinct words,
/// corrupts each with the word policy, then applies the sentence-level
/// operators with level-dependent probability.
pub fn corrupt_sentence(sentence: &str, level: Severity, rng: &mut impl Rng) -> SentenceOutcome {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.is_empty() {
        return SentenceOutcome {
            text: sentence.to_string(),
            applied: Vec::new(),
        };
    }

    let target = ((words.len() as f64) * level.word_fraction()).round() as usize;
    let num_corrupt = target.max(level.min_corrupt_words()).min(words.len());

    let chosen: Vec<usize> = rand::seq::index::sample(rng, words.len(), num_corrupt).into_vec();

    let mut applied: Vec<ErrorKind> = Vec::new();
    let mut out: Vec<String> = Vec::with_capacity(words.len());
    for (i, word) in words.iter().enumerate() {
        if chosen.contains(&i) {
            let outcome = corrupt_word(word, level, rng);
            for kind in outcome.applied {
                if !applied.contains(&kind) {
                    applied.push(kind);
                }
            }
            out.push(outcome.text);
        } else {
            out.push((*word).to_string());
        }
    }

    if matches!(level, Severity::Heavy | Severity::Extreme) && rng.gen_bool(RUN_TOGETHER_CHANCE) {
        let (merged, mutated) = ops::run_together(&out, rng);
        if mutated {
            out = merged;
            applied.push(ErrorKind::RunTogether);
        }
    }

    if level == Severity::Extreme && rng.gen_bool(SPLIT_CHANCE) && !out.is_empty() {
        let idx = rng.gen_range(0..out.len());
        let (split, mutated) = ops::split_word(&out[idx], rng);
        if mutated {
            out[idx] = split;
            applied.push(ErrorKind::Split);
        }
    }

    SentenceOutcome {
        text: out.join(" "),
        applied,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn count_diffs(a: &str, b: &str) -> usize {
        let aw: Vec<&str> = a.split_whitespace().collect();
        let bw: Vec<&str> = b.split_whitespace().collect();
        aw.iter().zip(bw.iter()).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn single_characters_and_punctuation_pass_through() {
        let mut r = rng(1);
        for token in ["a", "I", ".", "!?", "it's"] {
            let outcome = corrupt_word(token, Severity::Extreme, &mut r);
            assert_eq!(outcome.text, token, "token {token:?} must be untouched");
            assert!(outcome.applied.is_empty());
        }
    }

    #[test]
    fn corrupted_length_stays_within_bounds() {
        // After the safety floor, every result is within [0.4·len, 2·len].
        for seed in 0..200 {
            let mut r = rng(seed);
            for level in Severity::ALL {
                for word in ["dog", "where", "keyboard", "interpretation"] {
                    let len = word.chars().count() as f64;
                    let out = corrupt_word(word, level, &mut r).text;
                    let out_len = out.chars().count() as f64;
                    assert!(
                        out_len >= (len * 0.4).floor() && out_len <= len * 2.0,
                        "seed {seed} level {level:?}: {word:?} -> {out:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn two_letter_words_stay_within_bounds_at_low_levels() {
        // At Light/Medium at most two passes run, so a 2-char word can grow
        // to at most 4 characters.
        for seed in 0..200 {
            let mut r = rng(seed);
            for level in [Severity::Light, Severity::Medium] {
                let out = corrupt_word("am", level, &mut r).text;
                let out_len = out.chars().count();
                assert!(
                    (1..=4).contains(&out_len),
                    "seed {seed} level {level:?}: am -> {out:?}"
                );
            }
        }
    }

    #[test]
    fn light_sentence_touches_exactly_one_of_five_words() {
        // 5 words at the Light fraction 0.2 selects max(1, round(1.0)) = 1.
        for seed in 0..50 {
            let mut r = rng(seed);
            let out = corrupt_sentence("The quick brown fox jumps", Severity::Light, &mut r);
            let words: Vec<&str> = out.text.split_whitespace().collect();
            assert_eq!(words.len(), 5, "seed {seed}: Light never merges or splits");
            assert!(
                count_diffs("The quick brown fox jumps", &out.text) <= 1,
                "seed {seed}: more than one word changed: {:?}",
                out.text
            );
        }
    }

    #[test]
    fn corruption_rate_is_monotone_across_levels() {
        let sentence = "the research demonstrates a significant correlation between variables";
        let mut rates = Vec::new();
        for level in Severity::ALL {
            let mut changed = 0usize;
            let trials = 300;
            for seed in 0..trials {
                let mut r = rng(seed);
                let out = corrupt_sentence(sentence, level, &mut r);
                changed += count_diffs(sentence, &out.text);
            }
            rates.push(changed as f64 / trials as f64);
        }
        for pair in rates.windows(2) {
            assert!(
                pair[0] <= pair[1] + 0.15,
                "expected non-decreasing corruption rates, got {rates:?}"
            );
        }
        assert!(
            rates[3] > rates[0],
            "extreme must corrupt more than light: {rates:?}"
        );
    }

    #[test]
    fn misspelling_table_takes_precedence_when_it_fires() {
        let mut hits = 0usize;
        for seed in 0..100 {
            let mut r = rng(seed);
            let outcome = corrupt_word("because", Severity::Light, &mut r);
            if outcome.applied == vec![ErrorKind::Misspelling] {
                hits += 1;
                assert!(crate::corrupt::tables::misspellings_for("because")
                    .is_some_and(|m| m.contains(&outcome.text.as_str())));
            }
        }
        // Fires at roughly the configured 60%.
        assert!((35..=85).contains(&hits), "misspelling fired {hits}/100");
    }

    #[test]
    fn sentence_outcome_records_applied_operators() {
        let mut r = rng(77);
        let out = corrupt_sentence(
            "the algorithm processes the data very efficiently",
            Severity::Heavy,
            &mut r,
        );
        if out.text != "the algorithm processes the data very efficiently" {
            assert!(!out.applied.is_empty());
        }
    }

    #[test]
    fn empty_input_is_identity() {
        let mut r = rng(3);
        let out = corrupt_sentence("   ", Severity::Extreme, &mut r);
        assert_eq!(out.text, "   ");
        assert!(out.applied.is_empty());
    }
}
