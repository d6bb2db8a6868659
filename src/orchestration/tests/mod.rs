//! Unit tests for the orchestration subsystem.

mod merger_tests;

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{Value, json};

use crate::orchestration::domain::StreamEvent;
use crate::orchestration::services::{EventSink, EventStream};
use crate::test_support::FixedClock;
use crate::tool_registry::adapters::{builtin_tools, executor_fn};
use crate::tool_registry::domain::ToolDefinition;
use crate::tool_registry::ports::ToolExecutor;
use crate::tool_registry::services::{ToolDescriptor, ToolRegistry};

pub(super) fn gated(name: &str) -> ToolDescriptor {
    ToolDescriptor::requires_confirmation(
        ToolDefinition::new(
            name,
            "needs a human",
            json!({
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }),
        )
        .expect("valid definition"),
    )
}

pub(super) fn automatic(name: &str, executor: Arc<dyn ToolExecutor>) -> ToolDescriptor {
    ToolDescriptor::automatic(
        ToolDefinition::new(name, "runs automatically", json!({"type": "object"}))
            .expect("valid definition"),
        executor,
    )
}

/// Built-ins, a gated `delete_file`, and a gated `get_weather` with an
/// approval handler.
pub(super) fn registry() -> Arc<ToolRegistry> {
    let weather = executor_fn(|input: Value| async move {
        let city = input
            .get("city")
            .and_then(Value::as_str)
            .unwrap_or("nowhere")
            .to_owned();
        Ok(json!(format!("The weather in {city} is sunny")))
    });
    let get_weather = ToolDescriptor::requires_confirmation(
        ToolDefinition::new("get_weather", "Reports the weather", json!({"type": "object"}))
            .expect("valid definition"),
    )
    .with_approval_handler(weather);

    Arc::new(
        ToolRegistry::builder()
            .extend(builtin_tools(FixedClock::default()).expect("valid builtins"))
            .and_then(|builder| builder.register(gated("delete_file")))
            .and_then(|builder| builder.register(get_weather))
            .expect("unique tools")
            .build(),
    )
}

pub(super) fn multiply(a: i64, b: i64) -> Value {
    json!({"operation": "multiply", "a": a, "b": b})
}

pub(super) async fn drain(sink: EventSink, stream: EventStream) -> Vec<StreamEvent> {
    drop(sink);
    stream.collect().await
}
