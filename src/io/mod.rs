//! Corpus reading and instance writing.
pub mod reader;
pub mod writer;

pub use reader::CorpusReader;
pub use writer::{ExampleRecord, InstanceWriter};
