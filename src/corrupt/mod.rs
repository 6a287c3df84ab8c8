//! Typing-corruption simulator.
//!
//! Turns clean sentences into realistic fuzzy-typed text. The pieces are:
//!
//! - [`level`]: severity tiers controlling how many/which operators run
//! - [`ops`]: the individual pure text-mutation operators
//! - [`policy`]: weighted operator selection and the sentence-level pass
//! - [`tables`]: curated misspelling/abbreviation lookup data
//!
//! All operators degrade gracefully to identity on short or non-alphabetic
//! input; nothing in this module can fail.

pub mod level;
pub mod ops;
pub mod policy;
pub mod tables;

pub use level::Severity;
pub use policy::{corrupt_sentence, corrupt_word, SentenceOutcome, WordOutcome};

use serde::{Deserialize, Serialize};

/// Identifier for a corruption operator, recorded on training pairs so the
/// dataset composition can be audited per error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Adjacent,
    HandShift,
    Transpose,
    Delete,
    Duplicate,
    Insert,
    VowelDrop,
    Misspelling,
    Abbreviation,
    Visual,
    RunTogether,
    Split,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Adjacent => "adjacent",
            ErrorKind::HandShift => "hand_shift",
            ErrorKind::Transpose => "transpose",
            ErrorKind::Delete => "delete",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::Insert => "insert",
            ErrorKind::VowelDrop => "vowel_drop",
            ErrorKind::Misspelling => "misspelling",
            ErrorKind::Abbreviation => "abbreviation",
            ErrorKind::Visual => "visual",
            ErrorKind::RunTogether => "run_together",
            ErrorKind::Split => "split",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
