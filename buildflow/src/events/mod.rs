//! Event sink system for observability.
//!
//! The pipeline reports its lifecycle through an [`EventSink`]. Event types
//! are dotted strings; payloads are JSON objects.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event types emitted by the pipeline runner.
pub mod types {
    /// A run began.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A run finished in the `Done` state.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A run stopped early on a failing stage.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// A stage is about to run.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage returned zero.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// A stage returned non-zero.
    pub const STAGE_FAILED: &str = "stage.failed";
}
