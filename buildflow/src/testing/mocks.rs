//! Recording stages for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::core::StatusCode;
use crate::stages::Stage;

/// Ordered record of stage invocations, shared between stages.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl CallLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, stage: &str, args: &[String]) {
        self.calls.lock().push((stage.to_string(), args.to_vec()));
    }

    /// Returns every call as `(stage, args)`, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().clone()
    }

    /// Returns the names of the stages called, in order.
    #[must_use]
    pub fn stage_order(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(s, _)| s.clone()).collect()
    }
}

/// A stage that returns a fixed code and records each invocation.
#[derive(Debug)]
pub struct RecordingStage {
    name: String,
    code: Mutex<StatusCode>,
    invocations: Mutex<Vec<Vec<String>>>,
    log: Option<CallLog>,
}

impl RecordingStage {
    /// Creates a stage that returns `code`.
    #[must_use]
    pub fn new(name: impl Into<String>, code: i32) -> Self {
        Self {
            name: name.into(),
            code: Mutex::new(StatusCode::new(code)),
            invocations: Mutex::new(Vec::new()),
            log: None,
        }
    }

    /// Also records invocations into a shared log.
    #[must_use]
    pub fn with_log(mut self, log: &CallLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    /// Changes the code returned from now on.
    pub fn set_code(&self, code: i32) {
        *self.code.lock() = StatusCode::new(code);
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Returns the arguments of each call.
    #[must_use]
    pub fn invocations(&self) -> Vec<Vec<String>> {
        self.invocations.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.invocations.lock().clear();
    }
}

#[async_trait]
impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, args: &[String]) -> StatusCode {
        self.invocations.lock().push(args.to_vec());
        if let Some(log) = &self.log {
            log.record(&self.name, args);
        }
        *self.code.lock()
    }
}
