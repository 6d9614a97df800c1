//! Sequential fail-fast execution.

use super::{StagePolicy, StageSpec};
use crate::core::{RunReport, RunState, StageOutcome, StatusCode};
use crate::events::{types, EventSink, NoOpEventSink};
use crate::observability::SpanTimer;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn, Instrument};

/// An ordered list of stages run one after another.
///
/// A fail-fast stage that returns non-zero ends the run with that code. A
/// terminal stage's code is returned as is. If every stage is fail-fast and
/// succeeds, the run returns zero.
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<StageSpec>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub(crate) fn new(name: String, stages: Vec<StageSpec>) -> Self {
        Self {
            name,
            stages,
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Replaces the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage names in run order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    /// Returns the stage specifications in run order.
    #[must_use]
    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Runs the pipeline and returns only the overall status code.
    pub async fn run(&self) -> StatusCode {
        self.execute().await.code
    }

    /// Runs the pipeline and returns a full report.
    pub async fn execute(&self) -> RunReport {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!("pipeline", pipeline = %self.name, run_id = %run_id);
        self.execute_stages(run_id).instrument(span).await
    }

    async fn execute_stages(&self, run_id: String) -> RunReport {
        let timer = SpanTimer::start(&self.name);
        self.sink
            .emit(
                types::PIPELINE_STARTED,
                Some(json!({
                    "pipeline": self.name,
                    "run_id": run_id,
                    "stages": self.stage_names(),
                })),
            )
            .await;
        info!(stages = self.stages.len(), "Pipeline started");

        let mut outcomes = Vec::with_capacity(self.stages.len());
        let mut state = self
            .stages
            .first()
            .map_or(RunState::Done, |s| RunState::Pending(s.name.clone()));
        let mut code = StatusCode::SUCCESS;

        for (index, spec) in self.stages.iter().enumerate() {
            let outcome = self.run_stage(spec).await;
            code = outcome.code;
            outcomes.push(outcome);

            if spec.policy == StagePolicy::Terminal {
                state = RunState::Done;
                break;
            }
            if code.is_failure() {
                state = RunState::FailedEarly(spec.name.clone());
                break;
            }
            state = self
                .stages
                .get(index + 1)
                .map_or(RunState::Done, |next| RunState::Pending(next.name.clone()));
        }

        let duration_ms = timer.finish();
        let payload = json!({
            "pipeline": self.name,
            "run_id": run_id,
            "state": state,
            "code": code,
            "duration_ms": duration_ms,
        });
        match &state {
            RunState::FailedEarly(stage) => {
                warn!(stage = %stage, code = %code, duration_ms, "Pipeline stopped early");
                self.sink.emit(types::PIPELINE_FAILED, Some(payload)).await;
            }
            _ => {
                info!(code = %code, duration_ms, "Pipeline finished");
                self.sink.emit(types::PIPELINE_COMPLETED, Some(payload)).await;
            }
        }

        RunReport {
            pipeline: self.name.clone(),
            run_id,
            state,
            outcomes,
            code,
        }
    }

    async fn run_stage(&self, spec: &StageSpec) -> StageOutcome {
        self.sink
            .emit(
                types::STAGE_STARTED,
                Some(json!({"stage": spec.name, "args": spec.args})),
            )
            .await;
        info!(stage = %spec.name, args = ?spec.args, "Stage started");

        let started_at = Utc::now();
        let timer = SpanTimer::start(&spec.name);
        let code = spec
            .runner
            .run(&spec.args)
            .instrument(tracing::info_span!("stage", stage = %spec.name))
            .await;
        let duration_ms = timer.finish();

        let payload = json!({"stage": spec.name, "code": code, "duration_ms": duration_ms});
        if code.is_success() {
            info!(stage = %spec.name, duration_ms, "Stage completed");
            self.sink.emit(types::STAGE_COMPLETED, Some(payload)).await;
        } else {
            warn!(stage = %spec.name, code = %code, duration_ms, "Stage failed");
            self.sink.emit(types::STAGE_FAILED, Some(payload)).await;
        }

        StageOutcome::finished(spec.name.clone(), spec.args.clone(), code, started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::pipeline::PipelineBuilder;
    use crate::stages::FnStage;
    use crate::testing::RecordingStage;
    use pretty_assertions::assert_eq;

    const NO_ARGS: [&str; 0] = [];

    fn code(name: &str, value: i32) -> Arc<dyn crate::stages::Stage> {
        Arc::new(FnStage::new(name, move |_: &[String]| StatusCode::new(value)))
    }

    #[tokio::test]
    async fn test_all_fail_fast_stages_succeed() {
        let pipeline = PipelineBuilder::new("p")
            .stage("a", code("a", 0), NO_ARGS)
            .unwrap()
            .stage("b", code("b", 0), NO_ARGS)
            .unwrap()
            .build()
            .unwrap();

        let report = pipeline.execute().await;
        assert_eq!(report.code, StatusCode::SUCCESS);
        assert_eq!(report.state, RunState::Done);
        assert_eq!(report.stages_run(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_run() {
        let later = Arc::new(RecordingStage::new("b", 0));
        let pipeline = PipelineBuilder::new("p")
            .stage("a", code("a", 9), NO_ARGS)
            .unwrap()
            .stage("b", later.clone(), NO_ARGS)
            .unwrap()
            .build()
            .unwrap();

        let report = pipeline.execute().await;
        assert_eq!(report.code, StatusCode::new(9));
        assert_eq!(report.state, RunState::FailedEarly("a".to_string()));
        assert_eq!(later.call_count(), 0);
    }

    #[tokio::test]
    async fn test_terminal_code_is_returned() {
        let pipeline = PipelineBuilder::new("p")
            .stage("a", code("a", 0), NO_ARGS)
            .unwrap()
            .terminal_stage("z", code("z", 42), NO_ARGS)
            .unwrap()
            .build()
            .unwrap();

        let report = pipeline.execute().await;
        assert_eq!(report.code, StatusCode::new(42));
        assert_eq!(report.state, RunState::Done);
        assert_eq!(pipeline.run().await, StatusCode::new(42));
    }

    #[tokio::test]
    async fn test_events_on_success() {
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new("p")
            .stage("a", code("a", 0), NO_ARGS)
            .unwrap()
            .terminal_stage("z", code("z", 0), NO_ARGS)
            .unwrap()
            .with_event_sink(sink.clone())
            .build()
            .unwrap();

        pipeline.run().await;
        assert_eq!(
            sink.event_types(),
            vec![
                "pipeline.started",
                "stage.started",
                "stage.completed",
                "stage.started",
                "stage.completed",
                "pipeline.completed",
            ]
        );
    }

    #[tokio::test]
    async fn test_events_on_early_failure() {
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = PipelineBuilder::new("p")
            .stage("a", code("a", 3), NO_ARGS)
            .unwrap()
            .terminal_stage("z", code("z", 0), NO_ARGS)
            .unwrap()
            .build()
            .unwrap()
            .with_event_sink(sink.clone());

        pipeline.run().await;
        assert_eq!(
            sink.event_types(),
            vec!["pipeline.started", "stage.started", "stage.failed", "pipeline.failed"]
        );

        let failed = sink.payloads_of(types::STAGE_FAILED);
        let data = &failed[0];
        assert_eq!(data["stage"], "a");
        assert_eq!(data["code"], 3);

        let done = sink.payloads_of(types::PIPELINE_FAILED);
        let data = &done[0];
        assert_eq!(data["state"]["state"], "failed_early");
        assert_eq!(data["state"]["stage"], "a");
    }

    #[test]
    fn test_debug_lists_stages() {
        let pipeline = PipelineBuilder::new("p")
            .stage("a", code("a", 0), NO_ARGS)
            .unwrap()
            .build()
            .unwrap();
        let text = format!("{pipeline:?}");
        assert!(text.contains("\"a\""));
    }
}
