//! Closure-backed executors.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_registry::ports::{ToolExecutionResult, ToolExecutor};

/// Adapts an async closure into a [`ToolExecutor`].
///
/// Useful for approval handlers and for tools discovered at runtime whose
/// behaviour is a thin call into another client.
pub struct FnExecutor<F> {
    handler: F,
}

impl<F> FnExecutor<F> {
    /// Wraps `handler`.
    #[must_use]
    pub const fn new(handler: F) -> Self {
        Self { handler }
    }
}

impl<F> fmt::Debug for FnExecutor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExecutor").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> ToolExecutor for FnExecutor<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolExecutionResult<Value>> + Send + 'static,
{
    async fn execute(&self, input: &Value) -> ToolExecutionResult<Value> {
        (self.handler)(input.clone()).await
    }
}

/// Shorthand for `Arc::new(FnExecutor::new(handler))`.
///
/// # Examples
///
/// ```
/// use turnstile::tool_registry::adapters::executor_fn;
/// use serde_json::{Value, json};
///
/// let weather = executor_fn(|input: Value| async move {
///     let city = input["city"].as_str().unwrap_or("somewhere").to_owned();
///     Ok(json!(format!("The weather in {city} is sunny")))
/// });
/// # let _ = weather;
/// ```
pub fn executor_fn<F, Fut>(handler: F) -> Arc<dyn ToolExecutor>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ToolExecutionResult<Value>> + Send + 'static,
{
    Arc::new(FnExecutor::new(handler))
}
