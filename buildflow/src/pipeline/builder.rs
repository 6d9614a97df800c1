//! Pipeline builder with validation.

use super::{Pipeline, StagePolicy, StageSpec};
use crate::errors::{ContractErrorInfo, PipelineValidationError};
use crate::events::EventSink;
use crate::stages::Stage;
use std::sync::Arc;

/// Builder for creating validated pipelines.
#[derive(Clone)]
pub struct PipelineBuilder {
    name: String,
    stages: Vec<StageSpec>,
    sink: Option<Arc<dyn EventSink>>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("stages", &self.stages)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl PipelineBuilder {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            sink: None,
        }
    }

    /// Appends a fail-fast stage.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn stage<I, S>(
        self,
        name: impl Into<String>,
        runner: Arc<dyn Stage>,
        args: I,
    ) -> Result<Self, PipelineValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_stage_spec(StageSpec::new(name, runner).with_args(args))
    }

    /// Appends a terminal stage. No stage may follow it.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn terminal_stage<I, S>(
        self,
        name: impl Into<String>,
        runner: Arc<dyn Stage>,
        args: I,
    ) -> Result<Self, PipelineValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_stage_spec(StageSpec::new(name, runner).with_args(args).terminal())
    }

    /// Appends a stage specification, consuming the builder.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn with_stage_spec(mut self, spec: StageSpec) -> Result<Self, PipelineValidationError> {
        self.add_stage_spec(spec)?;
        Ok(self)
    }

    /// Appends a stage specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or already used, or if a terminal
    /// stage was already added.
    pub fn add_stage_spec(&mut self, spec: StageSpec) -> Result<(), PipelineValidationError> {
        spec.validate()?;

        if self.stages.iter().any(|s| s.name == spec.name) {
            return Err(PipelineValidationError::new(format!(
                "Stage '{}' is defined more than once",
                spec.name
            ))
            .with_stages(vec![spec.name.clone()])
            .with_error_info(
                ContractErrorInfo::new(
                    "PIPELINE-DUPLICATE",
                    format!("Duplicate stage '{}'", spec.name),
                )
                .with_fix_hint("Stage names must be unique within a pipeline."),
            ));
        }

        if let Some(last) = self.stages.last() {
            if last.policy == StagePolicy::Terminal {
                return Err(PipelineValidationError::new(format!(
                    "Stage '{}' cannot follow terminal stage '{}'",
                    spec.name, last.name
                ))
                .with_stages(vec![last.name.clone(), spec.name.clone()])
                .with_error_info(
                    ContractErrorInfo::new(
                        "PIPELINE-AFTER-TERMINAL",
                        "Stage added after a terminal stage",
                    )
                    .with_context_entry("terminal", last.name.clone())
                    .with_fix_hint("Make the terminal stage the last one in the pipeline."),
                ));
            }
        }

        self.stages.push(spec);
        Ok(())
    }

    /// Sets the sink that receives lifecycle events.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder has no stages.
    pub fn build(self) -> Result<Pipeline, PipelineValidationError> {
        if self.stages.is_empty() {
            return Err(PipelineValidationError::new("Pipeline has no stages")
                .with_error_info(
                    ContractErrorInfo::new("PIPELINE-EMPTY", "Cannot build an empty pipeline")
                        .with_fix_hint("Add at least one stage to the pipeline before building."),
                ));
        }

        let pipeline = Pipeline::new(self.name, self.stages);
        Ok(match self.sink {
            Some(sink) => pipeline.with_event_sink(sink),
            None => pipeline,
        })
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StatusCode;
    use crate::stages::FnStage;

    fn ok(name: &str) -> Arc<dyn Stage> {
        Arc::new(FnStage::new(name, |_: &[String]| StatusCode::SUCCESS))
    }

    const NO_ARGS: [&str; 0] = [];

    #[test]
    fn test_builder_creation() {
        let builder = PipelineBuilder::new("complete");
        assert_eq!(builder.name(), "complete");
        assert_eq!(builder.stage_count(), 0);
    }

    #[test]
    fn test_builder_add_stages() {
        let builder = PipelineBuilder::new("complete")
            .stage("gendeps", ok("gendeps"), NO_ARGS)
            .unwrap()
            .terminal_stage("build", ok("build"), ["--name", "compiled"])
            .unwrap();

        assert_eq!(builder.stage_count(), 2);
        let pipeline = builder.build().unwrap();
        assert_eq!(pipeline.stage_names(), vec!["gendeps", "build"]);
    }

    #[test]
    fn test_builder_duplicate_stage() {
        let err = PipelineBuilder::new("p")
            .stage("check", ok("check"), NO_ARGS)
            .unwrap()
            .stage("check", ok("check"), NO_ARGS)
            .unwrap_err();

        assert_eq!(err.code(), Some("PIPELINE-DUPLICATE"));
        assert_eq!(err.stages, vec!["check".to_string()]);
    }

    #[test]
    fn test_builder_stage_after_terminal() {
        let err = PipelineBuilder::new("p")
            .terminal_stage("build", ok("build"), NO_ARGS)
            .unwrap()
            .stage("extra", ok("extra"), NO_ARGS)
            .unwrap_err();

        assert_eq!(err.code(), Some("PIPELINE-AFTER-TERMINAL"));
        assert_eq!(err.stages, vec!["build".to_string(), "extra".to_string()]);
    }

    #[test]
    fn test_builder_empty_build() {
        let err = PipelineBuilder::new("p").build().unwrap_err();
        assert_eq!(err.code(), Some("PIPELINE-EMPTY"));
    }

    #[test]
    fn test_builder_blank_stage_name() {
        let result = PipelineBuilder::new("p").stage(" ", ok("x"), NO_ARGS);
        assert!(result.is_err());
    }
}
