//! Tools that ship with every registry.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::Deserialize;
use serde_json::{Number, Value, json};

use crate::tool_registry::{
    domain::{ToolDefinition, ToolRegistryDomainError},
    ports::{ToolExecutionError, ToolExecutionResult, ToolExecutor},
    services::ToolDescriptor,
};

/// Name of the arithmetic tool.
pub const CALCULATOR_TOOL: &str = "calculator";

/// Name of the clock tool.
pub const CURRENT_TIME_TOOL: &str = "current_time";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Deserialize)]
struct CalculatorInput {
    operation: Operation,
    a: Number,
    b: Number,
}

/// Binary arithmetic over two numbers.
///
/// Integer operands stay integers for everything except division. Overflow
/// and division by zero are reported as tool failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calculator;

impl Calculator {
    /// Returns the tool definition.
    ///
    /// # Errors
    ///
    /// Propagates definition validation errors.
    pub fn definition() -> Result<ToolDefinition, ToolRegistryDomainError> {
        ToolDefinition::new(
            CALCULATOR_TOOL,
            "Performs a basic arithmetic operation on two numbers",
            json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["add", "subtract", "multiply", "divide"]
                    },
                    "a": {"type": "number"},
                    "b": {"type": "number"}
                },
                "required": ["operation", "a", "b"]
            }),
        )
    }

    /// Returns an automatic descriptor for the calculator.
    ///
    /// # Errors
    ///
    /// Propagates definition validation errors.
    pub fn descriptor() -> Result<ToolDescriptor, ToolRegistryDomainError> {
        Ok(ToolDescriptor::automatic(Self::definition()?, Arc::new(Self)))
    }
}

fn integer_result(operation: Operation, a: i64, b: i64) -> Option<i64> {
    match operation {
        Operation::Add => a.checked_add(b),
        Operation::Subtract => a.checked_sub(b),
        Operation::Multiply => a.checked_mul(b),
        Operation::Divide => None,
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "the calculator tool operates on JSON numbers"
)]
fn float_result(operation: Operation, a: f64, b: f64) -> ToolExecutionResult<Value> {
    let result = match operation {
        Operation::Add => a + b,
        Operation::Subtract => a - b,
        Operation::Multiply => a * b,
        Operation::Divide => {
            if b == 0.0 {
                return Err(ToolExecutionError::failed("division by zero"));
            }
            a / b
        }
    };
    Number::from_f64(result)
        .map(Value::Number)
        .ok_or_else(|| ToolExecutionError::failed("result is not a finite number"))
}

#[async_trait]
impl ToolExecutor for Calculator {
    async fn execute(&self, input: &Value) -> ToolExecutionResult<Value> {
        let CalculatorInput { operation, a, b } = CalculatorInput::deserialize(input)
            .map_err(|err| ToolExecutionError::InvalidInput(err.to_string()))?;

        if operation != Operation::Divide
            && let (Some(lhs), Some(rhs)) = (a.as_i64(), b.as_i64())
        {
            return integer_result(operation, lhs, rhs)
                .map(Value::from)
                .ok_or_else(|| ToolExecutionError::failed("integer overflow"));
        }

        let (Some(lhs), Some(rhs)) = (a.as_f64(), b.as_f64()) else {
            return Err(ToolExecutionError::InvalidInput(
                "operands must be finite numbers".to_owned(),
            ));
        };
        float_result(operation, lhs, rhs)
    }
}

/// Reports the current time from the injected clock.
#[derive(Debug, Clone)]
pub struct CurrentTime<C> {
    clock: C,
}

impl<C> CurrentTime<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates the tool around `clock`.
    #[must_use]
    pub const fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Returns the tool definition.
    ///
    /// # Errors
    ///
    /// Propagates definition validation errors.
    pub fn definition() -> Result<ToolDefinition, ToolRegistryDomainError> {
        ToolDefinition::new(
            CURRENT_TIME_TOOL,
            "Returns the current date and time in UTC",
            json!({"type": "object", "properties": {}}),
        )
    }

    /// Returns an automatic descriptor for this tool.
    ///
    /// # Errors
    ///
    /// Propagates definition validation errors.
    pub fn descriptor(self) -> Result<ToolDescriptor, ToolRegistryDomainError> {
        Ok(ToolDescriptor::automatic(Self::definition()?, Arc::new(self)))
    }
}

#[async_trait]
impl<C> ToolExecutor for CurrentTime<C>
where
    C: Clock + Send + Sync,
{
    async fn execute(&self, _input: &Value) -> ToolExecutionResult<Value> {
        let now = self.clock.utc();
        Ok(json!({
            "utc": now.to_rfc3339(),
            "unix_seconds": now.timestamp(),
        }))
    }
}

/// Returns descriptors for every built-in tool.
///
/// # Errors
///
/// Propagates definition validation errors.
pub fn builtin_tools<C>(clock: C) -> Result<Vec<ToolDescriptor>, ToolRegistryDomainError>
where
    C: Clock + Send + Sync + 'static,
{
    Ok(vec![
        Calculator::descriptor()?,
        CurrentTime::new(clock).descriptor()?,
    ])
}
