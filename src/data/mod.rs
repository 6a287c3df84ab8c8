//! Data acquisition and dataset assembly.
//!
//! - corpus download + sentence extraction (`corpus`)
//! - training-pair generation and train/validation splits (`dataset`)

pub mod corpus;
pub mod dataset;

pub use corpus::*;
pub use dataset::*;
