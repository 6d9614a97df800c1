//! Testing utilities for buildflow pipelines.
//!
//! This module provides recording stages that capture how the runner invokes
//! them, plus a shared call log for asserting order across stages.

mod mocks;

pub use mocks::{CallLog, RecordingStage};
