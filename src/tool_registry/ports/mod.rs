//! Port contracts for tool execution.

mod executor;

pub use executor::{ToolExecutionError, ToolExecutionResult, ToolExecutor};

#[cfg(test)]
pub use executor::MockToolExecutor;
