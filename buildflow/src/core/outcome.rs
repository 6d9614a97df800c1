//! Records of what a pipeline run did.

use super::{RunState, StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of running a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Stage name.
    pub name: String,
    /// Arguments the stage was invoked with.
    pub args: Vec<String>,
    /// Status code the stage returned.
    pub code: StatusCode,
    /// When the stage started.
    pub started_at: DateTime<Utc>,
    /// When the stage ended.
    pub ended_at: DateTime<Utc>,
}

impl StageOutcome {
    /// Creates an outcome that ends now.
    #[must_use]
    pub fn finished(
        name: impl Into<String>,
        args: Vec<String>,
        code: StatusCode,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            args,
            code,
            started_at,
            ended_at: Utc::now(),
        }
    }

    /// Returns the duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }

    /// Returns true if the stage succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Pipeline name.
    pub pipeline: String,
    /// Identifier of this run.
    pub run_id: String,
    /// Final state.
    pub state: RunState,
    /// Outcomes of the stages that actually ran, in order.
    pub outcomes: Vec<StageOutcome>,
    /// Overall status code.
    pub code: StatusCode,
}

impl RunReport {
    /// Returns the outcome for a stage, if it ran.
    #[must_use]
    pub fn outcome(&self, stage: &str) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.name == stage)
    }

    /// Returns true if the named stage was invoked.
    #[must_use]
    pub fn ran(&self, stage: &str) -> bool {
        self.outcome(stage).is_some()
    }

    /// Names of the stages that ran, in order.
    #[must_use]
    pub fn stages_run(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.name.as_str()).collect()
    }
}
