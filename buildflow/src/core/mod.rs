//! Core domain model types for buildflow.
//!
//! This module contains the fundamental types shared by the runner and stages:
//! - Status codes and run states
//! - Stage outcomes and run reports

mod outcome;
mod status;

pub use outcome::{RunReport, StageOutcome};
pub use status::{RunState, StatusCode};
