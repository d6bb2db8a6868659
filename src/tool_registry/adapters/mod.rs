//! Executor adapters: built-in tools and closure-backed executors.

mod builtin;
mod function;

pub use builtin::{CALCULATOR_TOOL, CURRENT_TIME_TOOL, Calculator, CurrentTime, builtin_tools};
pub use function::{FnExecutor, executor_fn};
