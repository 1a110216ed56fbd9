//! Stochastic building blocks of instance construction.
//!
//! Everything here consumes an explicit, caller-provided random source:
//! draws happen in a documented order so a seeded run is reproducible.
pub mod mask;
pub mod ngram;
pub mod truncate;

pub use mask::{create_masked_lm_predictions, MaskedSequence};
pub use ngram::NgramSampler;
pub use truncate::truncate_seq_pair;
