//! The complete compiled build: generate dependencies, check, then build.

use crate::config::{BuildConfig, CommandSpec};
use crate::core::StatusCode;
use crate::errors::{BuildflowError, PipelineValidationError};
use crate::events::{EventSink, LoggingEventSink};
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::stages::{CommandStage, Stage};
use std::sync::Arc;

/// Pipeline name.
pub const PIPELINE_NAME: &str = "complete";
/// Dependency generation stage.
pub const GENDEPS_STAGE: &str = "gendeps";
/// Static check stage.
pub const CHECK_STAGE: &str = "check";
/// Compilation stage.
pub const BUILD_STAGE: &str = "build";
/// Arguments passed to the build stage.
pub const BUILD_ARGS: [&str; 3] = ["--name", "compiled", "+@complete"];

const NO_ARGS: [&str; 0] = [];

/// Builds the pipeline from any three stage implementations.
///
/// `gendeps` and `check` run with no arguments and stop the run on failure;
/// `build` runs with [`BUILD_ARGS`] and its code is always the result.
pub fn pipeline_with(
    gendeps: Arc<dyn Stage>,
    check: Arc<dyn Stage>,
    build: Arc<dyn Stage>,
) -> Result<Pipeline, PipelineValidationError> {
    PipelineBuilder::new(PIPELINE_NAME)
        .stage(GENDEPS_STAGE, gendeps, NO_ARGS)?
        .stage(CHECK_STAGE, check, NO_ARGS)?
        .terminal_stage(BUILD_STAGE, build, BUILD_ARGS)?
        .build()
}

/// Builds the pipeline from configured external commands.
///
/// The configuration is validated first, so a blank root or program is
/// reported as [`BuildflowError::Config`].
pub fn build_pipeline(config: &BuildConfig) -> Result<Pipeline, BuildflowError> {
    config.validate()?;
    let stage = |name: &str, spec: &CommandSpec| -> Arc<dyn Stage> {
        Arc::new(CommandStage::from_spec(name, spec).with_current_dir(&config.root))
    };
    let sink: Arc<dyn EventSink> = Arc::new(LoggingEventSink::debug());

    Ok(pipeline_with(
        stage(GENDEPS_STAGE, &config.gendeps),
        stage(CHECK_STAGE, &config.check),
        stage(BUILD_STAGE, &config.build),
    )?
    .with_event_sink(sink))
}

/// Process entry point. The arguments are accepted and ignored.
pub async fn main(_args: &[String], config: &BuildConfig) -> StatusCode {
    match build_pipeline(config) {
        Ok(pipeline) => pipeline.run().await,
        Err(err) => {
            tracing::error!(error = %err, "Cannot start the build");
            StatusCode::FAILURE
        }
    }
}
