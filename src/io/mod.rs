//! Input/output helpers.
//!
//! - training-pair JSONL and corpus text files (`jsonl`)
//! - fine-tuning format conversion (`formats`)

pub mod formats;
pub mod jsonl;

pub use formats::*;
pub use jsonl::*;
