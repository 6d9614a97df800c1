//! Runs an entry function as the body of a process.
//!
//! The entry function receives the process arguments and returns a
//! [`StatusCode`] that becomes the exit status. A keyboard interrupt ends the
//! process with status 1.

use crate::core::StatusCode;
use crate::observability::{init_logging, LogFormat};
use std::future::Future;
use std::process::ExitCode;
use tracing::{error, warn};

/// Initialises logging, runs `main` with the process arguments and returns
/// its code as the exit status.
pub fn run_main<F, Fut>(main: F) -> ExitCode
where
    F: FnOnce(Vec<String>) -> Fut,
    Fut: Future<Output = StatusCode>,
{
    init_logging(LogFormat::from_env());
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    run_with_args(main, args).into()
}

/// Runs `main` on a current-thread runtime, racing it against Ctrl-C.
pub fn run_with_args<F, Fut>(main: F, args: Vec<String>) -> StatusCode
where
    F: FnOnce(Vec<String>) -> Fut,
    Fut: Future<Output = StatusCode>,
{
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "Failed to start async runtime");
            return StatusCode::FAILURE;
        }
    };

    runtime.block_on(until_interrupted(main(args), interrupted()))
}

/// Drives `work` unless `interrupt` resolves first, in which case `work` is
/// dropped and the result is [`StatusCode::FAILURE`].
async fn until_interrupted<W, I>(work: W, interrupt: I) -> StatusCode
where
    W: Future<Output = StatusCode>,
    I: Future<Output = ()>,
{
    tokio::select! {
        code = work => code,
        () = interrupt => {
            warn!("Interrupted");
            StatusCode::FAILURE
        }
    }
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
