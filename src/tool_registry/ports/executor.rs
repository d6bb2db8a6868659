//! Executor port invoked by the orchestrator for each resolved tool call.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tool executions.
pub type ToolExecutionResult<T> = Result<T, ToolExecutionError>;

/// Runs one tool against a schema-validated input.
///
/// Implementations may perform network or scheduling calls. They must not
/// panic on bad input; failures are reported as [`ToolExecutionError`] and
/// recorded against the single call that produced them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Executes the tool and returns its structured output.
    async fn execute(&self, input: &Value) -> ToolExecutionResult<Value>;
}

/// Errors reported by tool executors.
#[derive(Debug, Clone, Error)]
pub enum ToolExecutionError {
    /// The input passed schema validation but is semantically unusable.
    #[error("invalid tool input: {0}")]
    InvalidInput(String),

    /// The tool ran and reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The executor's infrastructure failed.
    #[error("tool runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolExecutionError {
    /// Creates a tool-reported failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Wraps an infrastructure error from the executor.
    #[must_use]
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
