//! # maskgen
//!
//! maskgen turns a corpus of tokenized documents into labeled training
//! examples for a masked-language-model + sentence-relationship
//! objective.
//!
//! It can be used as a tool over JSONL corpora, or as a lib to embed
//! instance generation into other projects: see
//! [pipelines::pretrain::generate_instances] for the corpus-level entry
//! point and [sampling] for the building blocks.
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod pipelines;
pub mod sampling;
pub mod types;
