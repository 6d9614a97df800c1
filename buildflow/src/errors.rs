//! Error types for buildflow.
//!
//! Stage failures are not errors: a failing stage reports a non-zero
//! [`StatusCode`](crate::core::StatusCode) and the runner forwards it. The
//! types here cover everything around the pipeline: loading configuration
//! and building it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for buildflow operations.
#[derive(Debug, Error)]
pub enum BuildflowError {
    /// A pipeline validation error occurred.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// Configuration could not be loaded or is invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Metadata about a contract error for better diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContractErrorInfo {
    /// Error code (e.g., "PIPELINE-DUPLICATE").
    pub code: String,
    /// Short summary of the error.
    pub summary: String,
    /// Hint for fixing the error.
    pub fix_hint: Option<String>,
    /// Additional context key-value pairs.
    #[serde(default)]
    pub context: HashMap<String, String>,
}

impl ContractErrorInfo {
    /// Creates a new contract error info.
    #[must_use]
    pub fn new(code: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            summary: summary.into(),
            fix_hint: None,
            context: HashMap::new(),
        }
    }

    /// Sets the fix hint.
    #[must_use]
    pub fn with_fix_hint(mut self, hint: impl Into<String>) -> Self {
        self.fix_hint = Some(hint.into());
        self
    }

    /// Adds a single context entry.
    #[must_use]
    pub fn with_context_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Error raised when a pipeline definition is rejected.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The stages involved in the error.
    pub stages: Vec<String>,
    /// Optional contract error info.
    pub error_info: Option<ContractErrorInfo>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stages: Vec::new(),
            error_info: None,
        }
    }

    /// Sets the stages involved.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<String>) -> Self {
        self.stages = stages;
        self
    }

    /// Sets the contract error info.
    #[must_use]
    pub fn with_error_info(mut self, info: ContractErrorInfo) -> Self {
        self.error_info = Some(info);
        self
    }

    /// Returns the contract error code, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.error_info.as_ref().map(|info| info.code.as_str())
    }
}

/// Error raised while loading [`BuildConfig`](crate::config::BuildConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the config schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path of the file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// A command was configured without a program.
    #[error("command for stage '{stage}' is empty")]
    EmptyCommand {
        /// Stage whose command is empty.
        stage: String,
    },

    /// A command line opened a quote it never closed.
    #[error("command for stage '{stage}' has an unterminated {quote} quote")]
    UnterminatedQuote {
        /// Stage whose command is malformed.
        stage: String,
        /// The quote character left open.
        quote: char,
    },

    /// The working directory is blank.
    #[error("working directory is empty")]
    EmptyRoot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_info_creation() {
        let info = ContractErrorInfo::new("PIPELINE-DUPLICATE", "Duplicate stage")
            .with_fix_hint("Rename one of the stages")
            .with_context_entry("stage", "check");

        assert_eq!(info.code, "PIPELINE-DUPLICATE");
        assert_eq!(info.summary, "Duplicate stage");
        assert_eq!(info.fix_hint, Some("Rename one of the stages".to_string()));
        assert_eq!(info.context.get("stage"), Some(&"check".to_string()));
    }

    #[test]
    fn test_validation_error_code() {
        let err = PipelineValidationError::new("bad pipeline")
            .with_stages(vec!["gendeps".to_string()])
            .with_error_info(ContractErrorInfo::new("PIPELINE-EMPTY", "no stages"));

        assert_eq!(err.to_string(), "bad pipeline");
        assert_eq!(err.code(), Some("PIPELINE-EMPTY"));
        assert_eq!(err.stages, vec!["gendeps".to_string()]);
    }

    #[test]
    fn test_buildflow_error_from_validation() {
        let err: BuildflowError = PipelineValidationError::new("oops").into();
        assert!(matches!(err, BuildflowError::Validation(_)));
        assert_eq!(err.to_string(), "oops");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::EmptyCommand {
            stage: "check".to_string(),
        };
        assert_eq!(err.to_string(), "command for stage 'check' is empty");

        let err = ConfigError::UnterminatedQuote {
            stage: "build".to_string(),
            quote: '"',
        };
        assert_eq!(
            err.to_string(),
            "command for stage 'build' has an unterminated \" quote"
        );
    }

    #[test]
    fn test_buildflow_error_from_config() {
        let err: BuildflowError = ConfigError::EmptyRoot.into();
        assert!(matches!(err, BuildflowError::Config(ConfigError::EmptyRoot)));
        assert_eq!(err.to_string(), "working directory is empty");
    }
}
