//! Stage trait and implementations.
//!
//! A stage is one external collaborator of the build: it takes an argument
//! list and reports a [`StatusCode`].

mod command;

pub use command::CommandStage;

use crate::core::StatusCode;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline stages.
///
/// Stages communicate exclusively through their status code. A stage that
/// cannot do its work reports a non-zero code instead of returning an error.
#[async_trait]
pub trait Stage: Send + Sync + Debug {
    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Runs the stage with the given arguments.
    async fn run(&self, args: &[String]) -> StatusCode;
}

/// A simple function-based stage.
pub struct FnStage<F>
where
    F: Fn(&[String]) -> StatusCode + Send + Sync,
{
    name: String,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&[String]) -> StatusCode + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(&[String]) -> StatusCode + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&[String]) -> StatusCode + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, args: &[String]) -> StatusCode {
        (self.func)(args)
    }
}
