//! Status codes and pipeline run states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer result of a stage.
///
/// Zero means success. Any other value means failure; the value itself is
/// opaque and is forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(i32);

impl StatusCode {
    /// The success code.
    pub const SUCCESS: Self = Self(0);

    /// Generic failure, used for interrupts and host errors.
    pub const FAILURE: Self = Self(1);

    /// Reported when a collaborator program exists but cannot be executed.
    pub const NOT_EXECUTABLE: Self = Self(126);

    /// Reported when a collaborator program could not be launched.
    pub const NOT_FOUND: Self = Self(127);

    /// Wraps a raw code.
    #[must_use]
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// Returns the raw code.
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Returns true if the code is zero.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the code is non-zero.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        self.0 != 0
    }

    /// Narrows the code to the 8 bits a process exit status can carry.
    ///
    /// A failing code whose low byte is zero maps to 1 so that it never
    /// reads as success.
    #[must_use]
    pub const fn exit_byte(self) -> u8 {
        let low = (self.0 & 0xff) as u8;
        if self.0 != 0 && low == 0 {
            1
        } else {
            low
        }
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl From<StatusCode> for std::process::ExitCode {
    fn from(code: StatusCode) -> Self {
        Self::from(code.exit_byte())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a pipeline run currently is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum RunState {
    /// The named stage is next to run.
    Pending(String),
    /// The terminal stage ran, or every stage succeeded.
    Done,
    /// A fail-fast stage returned non-zero and the run stopped.
    FailedEarly(String),
}

impl RunState {
    /// Returns true if the run cannot progress any further.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::FailedEarly(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending(stage) => write!(f, "pending({stage})"),
            Self::Done => write!(f, "done"),
            Self::FailedEarly(stage) => write!(f, "failed_early({stage})"),
        }
    }
}
