//! Event sinks for pipeline lifecycle events.

use super::types;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Receives the events a pipeline run emits, in order.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Records one event. `data` is a JSON object describing it.
    async fn emit(&self, event_type: &str, data: Option<Value>);
}

/// Discards every event. Pipelines use it until a sink is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event_type: &str, _data: Option<Value>) {}
}

/// Writes events to the log.
///
/// Failure events (`stage.failed`, `pipeline.failed`) are always logged at
/// warn level; everything else at info, or debug when `verbose` is off.
#[derive(Debug, Clone, Copy)]
pub struct LoggingEventSink {
    verbose: bool,
}

impl LoggingEventSink {
    /// Logs routine events at info level.
    #[must_use]
    pub const fn info() -> Self {
        Self { verbose: true }
    }

    /// Logs routine events at debug level.
    #[must_use]
    pub const fn debug() -> Self {
        Self { verbose: false }
    }
}

#[async_trait]
impl EventSink for LoggingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        let data = data.unwrap_or(Value::Null);
        if event_type == types::STAGE_FAILED || event_type == types::PIPELINE_FAILED {
            warn!(event_type, %data, "Pipeline event");
        } else if self.verbose {
            info!(event_type, %data, "Pipeline event");
        } else {
            debug!(event_type, %data, "Pipeline event");
        }
    }
}

/// Keeps every event in memory so tests can assert on them.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: Mutex<Vec<(String, Option<Value>)>>,
}

impl CollectingEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Event types received so far, in order.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.events.lock().iter().map(|(t, _)| t.clone()).collect()
    }

    /// Payloads of the events with exactly this type, in order.
    #[must_use]
    pub fn payloads_of(&self, event_type: &str) -> Vec<Value> {
        self.events
            .lock()
            .iter()
            .filter(|(t, _)| t == event_type)
            .map(|(_, data)| data.clone().unwrap_or(Value::Null))
            .collect()
    }
}

#[async_trait]
impl EventSink for CollectingEventSink {
    async fn emit(&self, event_type: &str, data: Option<Value>) {
        self.events.lock().push((event_type.to_string(), data));
    }
}
