//! Pipelines.
//!
//! The module provides a light [pipeline::Pipeline] trait that enables
//! easy and flexible pipeline creation.
pub mod pipeline;
pub mod pretrain;

pub use pipeline::Pipeline;
pub use pretrain::Pretrain;
