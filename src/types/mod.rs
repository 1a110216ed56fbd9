//! Core data model: tokens, documents, corpus and training instances.
pub mod document;
pub mod instance;
pub mod special;

pub use document::{Corpus, Document, Sentence};
pub use instance::TrainingInstance;
pub use special::TokenId;
