//! Corruption severity tiers.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How aggressively a sentence gets garbled.
///
/// The ordering is load-bearing: every per-level knob (operation count,
/// per-character intensity, fraction of words touched) is monotone in it.
/// The constants themselves are empirically tuned and should be treated as
/// configuration, not as derived quantities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Light,
    Medium,
    Heavy,
    Extreme,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Light,
        Severity::Medium,
        Severity::Heavy,
        Severity::Extreme,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Severity::Light => "light",
            Severity::Medium => "medium",
            Severity::Heavy => "heavy",
            Severity::Extreme => "extreme",
        }
    }

    /// Number of corruption passes applied to a selected word.
    pub fn operations(self) -> usize {
        match self {
            Severity::Light => 1,
            Severity::Medium => 2,
            Severity::Heavy => 3,
            Severity::Extreme => 4,
        }
    }

    /// Per-character mutation probability for intensity-driven operators.
    pub fn intensity(self) -> f64 {
        match self {
            Severity::Light => 0.2,
            Severity::Medium => 0.35,
            Severity::Heavy => 0.5,
            Severity::Extreme => 0.7,
        }
    }

    /// Fraction of a sentence's words selected for corruption.
    pub fn word_fraction(self) -> f64 {
        match self {
            Severity::Light => 0.2,
            Severity::Medium => 0.4,
            Severity::Heavy => 0.6,
            Severity::Extreme => 0.8,
        }
    }

    /// Lower bound on the number of words corrupted, regardless of sentence
    /// length.
    pub fn min_corrupt_words(self) -> usize {
        match self {
            Severity::Light | Severity::Medium => 1,
            Severity::Heavy => 2,
            Severity::Extreme => 3,
        }
    }

    /// Default share of a generated dataset at this level.
    pub fn default_proportion(self) -> f64 {
        match self {
            Severity::Light | Severity::Extreme => 0.15,
            Severity::Medium | Severity::Heavy => 0.35,
        }
    }
}
