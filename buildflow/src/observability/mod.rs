//! Logging setup and timing helpers.

mod logging;

pub use logging::{init_logging, LogFormat, SpanTimer, LOG_FORMAT_ENV};
