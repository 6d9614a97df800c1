//! Stage backed by an external program.

use super::Stage;
use crate::config::CommandSpec;
use crate::core::StatusCode;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs an external program and reports its exit status.
///
/// The program inherits stdin, stdout and stderr so collaborator diagnostics
/// reach the terminal unchanged.
#[derive(Debug, Clone)]
pub struct CommandStage {
    name: String,
    program: String,
    base_args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandStage {
    /// Creates a stage that runs `program`.
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            base_args: Vec::new(),
            current_dir: None,
        }
    }

    /// Creates a stage from a configured command.
    #[must_use]
    pub fn from_spec(name: impl Into<String>, spec: &CommandSpec) -> Self {
        Self::new(name, spec.program.clone()).with_base_args(spec.args.iter().cloned())
    }

    /// Sets arguments placed before the stage arguments.
    #[must_use]
    pub fn with_base_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.base_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Returns the program this stage runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the full argument list for an invocation.
    #[must_use]
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        self.base_args.iter().chain(args).cloned().collect()
    }
}

#[async_trait]
impl Stage for CommandStage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, args: &[String]) -> StatusCode {
        let argv = self.command_line(args);
        let mut command = Command::new(&self.program);
        command.args(&argv).kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        debug!(stage = %self.name, program = %self.program, ?argv, "Spawning stage command");

        match command.status().await {
            Ok(status) => status_code(status),
            Err(err) => {
                error!(
                    stage = %self.name,
                    program = %self.program,
                    error = %err,
                    "Failed to launch stage command"
                );
                launch_failure_code(&err)
            }
        }
    }
}

/// Launch failures use the shell's codes: 126 when the program exists but
/// cannot be executed, 127 otherwise.
fn launch_failure_code(err: &std::io::Error) -> StatusCode {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        StatusCode::NOT_EXECUTABLE
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Maps a process exit status onto a stage status code.
///
/// Processes killed by a signal report `128 + signal`, as shells do.
fn status_code(status: ExitStatus) -> StatusCode {
    if let Some(code) = status.code() {
        return StatusCode::new(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return StatusCode::new(128 + signal);
        }
    }

    StatusCode::FAILURE
}
