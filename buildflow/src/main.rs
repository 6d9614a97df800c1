//! `build-all`: generate dependencies, run the checks, then compile.
//!
//! Exits with the code of the first failing step, or with the compiler's
//! code when the earlier steps pass.

use anyhow::Context;
use buildflow::config::BuildConfig;
use buildflow::core::StatusCode;
use buildflow::{complete, host};
use std::process::ExitCode;

fn load_config() -> anyhow::Result<BuildConfig> {
    BuildConfig::from_env().context("failed to load build configuration")
}

fn main() -> ExitCode {
    host::run_main(|args| async move {
        match load_config() {
            Ok(config) => complete::main(&args, &config).await,
            Err(err) => {
                let message = format!("{err:#}");
                tracing::error!(error = %message, "Cannot start build");
                StatusCode::FAILURE
            }
        }
    })
}
