//! # Buildflow
//!
//! A fail-fast runner for build pipelines made of external steps.
//!
//! Each stage is an external collaborator that takes an argument list and
//! reports an integer status code. The runner invokes stages strictly in
//! order, stops on the first failing fail-fast stage, and returns a terminal
//! stage's code unconditionally.
//!
//! - **Stages**: external commands or closures behind the [`Stage`](stages::Stage) trait
//! - **Pipelines**: validated, ordered stage lists with per-stage policies
//! - **Events**: lifecycle events for logging and tests
//! - **Complete build**: the `gendeps` → `check` → `build` pipeline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use buildflow::prelude::*;
//!
//! let pipeline = PipelineBuilder::new("release")
//!     .stage("lint", Arc::new(CommandStage::new("lint", "make")), ["lint"])?
//!     .terminal_stage("dist", Arc::new(CommandStage::new("dist", "make")), ["dist"])?
//!     .build()?;
//!
//! let code = pipeline.run().await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod complete;
pub mod config;
pub mod core;
pub mod errors;
pub mod events;
pub mod host;
pub mod observability;
pub mod pipeline;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BuildConfig, CommandSpec};
    pub use crate::core::{RunReport, RunState, StageOutcome, StatusCode};
    pub use crate::errors::{BuildflowError, ConfigError, PipelineValidationError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::pipeline::{Pipeline, PipelineBuilder, StagePolicy, StageSpec};
    pub use crate::stages::{CommandStage, FnStage, Stage};
    pub use std::sync::Arc;
}
