//! Stage specifications.

use crate::errors::{ContractErrorInfo, PipelineValidationError};
use crate::stages::Stage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What the runner does with a stage's status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePolicy {
    /// A non-zero code stops the run and becomes its result.
    #[default]
    FailFast,
    /// The code is the run's result, whatever it is. Nothing runs after.
    Terminal,
}

/// Specification for a single stage in a pipeline.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub name: String,
    /// The stage implementation.
    pub runner: Arc<dyn Stage>,
    /// Arguments passed on every invocation.
    pub args: Vec<String>,
    /// How the status code is treated.
    pub policy: StagePolicy,
}

impl StageSpec {
    /// Creates a fail-fast stage with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>, runner: Arc<dyn Stage>) -> Self {
        Self {
            name: name.into(),
            runner,
            args: Vec::new(),
            policy: StagePolicy::FailFast,
        }
    }

    /// Sets the arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: StagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Marks the stage as terminal.
    #[must_use]
    pub const fn terminal(self) -> Self {
        self.with_policy(StagePolicy::Terminal)
    }

    /// Validates the stage specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new("Stage name cannot be empty")
                .with_error_info(
                    ContractErrorInfo::new("PIPELINE-EMPTY-NAME", "Stage has no name")
                        .with_fix_hint("Give every stage a non-blank name."),
                ));
        }
        Ok(())
    }
}
