//! Pipeline building and execution.
//!
//! This module provides:
//! - Stage specifications and policies
//! - Pipeline builder with validation
//! - The sequential fail-fast runner

mod builder;
mod runner;
mod spec;

pub use builder::PipelineBuilder;
pub use runner::Pipeline;
pub use spec::{StagePolicy, StageSpec};
