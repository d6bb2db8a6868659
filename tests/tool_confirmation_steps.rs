//! BDD steps for confirmation-gated tool orchestration.

use std::sync::Arc;

use eyre::{WrapErr, eyre};
use futures::StreamExt;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use turnstile::message::domain::{
    Message, Part, Role, ToolCallPart, ToolCallState, ToolDecisionPart,
};
use turnstile::orchestration::{
    domain::{OrchestrationOutcome, StreamEvent},
    services::{EventSink, ToolCallOrchestrator},
};
use turnstile::tool_registry::{
    adapters::{builtin_tools, executor_fn},
    domain::ToolDefinition,
    services::{ToolDescriptor, ToolRegistry},
};

struct ConfirmationWorld {
    orchestrator: ToolCallOrchestrator,
    history: Vec<Message>,
    outcome: Option<OrchestrationOutcome>,
    events: Vec<StreamEvent>,
}

impl Default for ConfirmationWorld {
    fn default() -> Self {
        Self {
            orchestrator: ToolCallOrchestrator::new(Arc::new(registry())),
            history: Vec::new(),
            outcome: None,
            events: Vec::new(),
        }
    }
}

#[fixture]
fn world() -> ConfirmationWorld {
    ConfirmationWorld::default()
}

fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn registry() -> ToolRegistry {
    let delete_file = ToolDefinition::new(
        "delete_file",
        "Deletes a file",
        json!({"type": "object", "required": ["path"]}),
    )
    .expect("valid definition");
    let handler = executor_fn(|input: Value| async move {
        let path = input
            .get("path")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Ok(json!(format!("deleted {path}")))
    });

    ToolRegistry::builder()
        .extend(builtin_tools(DefaultClock).expect("builtin tools"))
        .and_then(|builder| {
            builder.register(
                ToolDescriptor::requires_confirmation(delete_file).with_approval_handler(handler),
            )
        })
        .expect("registry builds")
        .build()
}

fn input_for(tool: &str) -> Value {
    match tool {
        "calculator" => json!({"operation": "multiply", "a": 3, "b": 4}),
        "delete_file" => json!({"path": "X"}),
        _ => json!({}),
    }
}

fn user_turn(world: &mut ConfirmationWorld, part: Part) -> Result<(), eyre::Report> {
    let message = Message::new(Role::User, vec![part], &DefaultClock)
        .wrap_err("decision message should build")?;
    world.history.push(message);
    Ok(())
}

fn resolved_call<'a>(
    world: &'a ConfirmationWorld,
    tool: &str,
) -> Result<&'a ToolCallPart, eyre::Report> {
    let outcome = world
        .outcome
        .as_ref()
        .ok_or_else(|| eyre!("the orchestrator has not run"))?;
    outcome
        .messages
        .iter()
        .flat_map(Message::tool_calls)
        .find(|call| call.tool_name == tool)
        .ok_or_else(|| eyre!("no call to {tool}"))
}

#[given("an assistant turn calling {first} and {second}")]
fn assistant_turn(
    world: &mut ConfirmationWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let calls = [first, second]
        .iter()
        .enumerate()
        .map(|(index, tool)| {
            Part::ToolCall(ToolCallPart::new(
                format!("c{index}"),
                tool.as_str(),
                input_for(tool),
            ))
        })
        .collect();
    let opening = Message::new(Role::User, vec![Part::text("please help")], &DefaultClock)
        .wrap_err("user message should build")?;
    let assistant =
        Message::new(Role::Assistant, calls, &DefaultClock).wrap_err("turn should build")?;
    world.history = vec![opening, assistant];
    Ok(())
}

#[given("the user denies the delete_file call because {reason}")]
fn user_denies(world: &mut ConfirmationWorld, reason: String) -> Result<(), eyre::Report> {
    let decision = ToolDecisionPart::deny("c1", Some(reason.trim_matches('"').to_owned()));
    user_turn(world, Part::ToolDecision(decision))
}

#[given("the user approves the delete_file call")]
fn user_approves(world: &mut ConfirmationWorld) -> Result<(), eyre::Report> {
    user_turn(world, Part::ToolDecision(ToolDecisionPart::approve("c1")))
}

#[when("the orchestrator processes the history")]
fn orchestrator_processes(world: &mut ConfirmationWorld) {
    let (sink, stream) = EventSink::channel();
    let history = std::mem::take(&mut world.history);
    let outcome = run_async(world.orchestrator.process(
        history,
        &sink,
        &CancellationToken::new(),
    ));
    drop(sink);
    world.events = run_async(stream.collect());
    world.outcome = Some(outcome);
}

#[then("the {tool} call holds output {output}")]
fn call_holds_output(
    world: &ConfirmationWorld,
    tool: String,
    output: String,
) -> Result<(), eyre::Report> {
    let expected: Value =
        serde_json::from_str(&output).wrap_err("expected output should be JSON")?;
    let call = resolved_call(world, &tool)?;
    assert_eq!(call.state, ToolCallState::OutputAvailable { output: expected });
    Ok(())
}

#[then("the {tool} call failed with {error_text}")]
fn call_failed_with(
    world: &ConfirmationWorld,
    tool: String,
    error_text: String,
) -> Result<(), eyre::Report> {
    let call = resolved_call(world, &tool)?;
    assert_eq!(
        call.state,
        ToolCallState::OutputError {
            error_text: error_text.trim_matches('"').to_owned(),
        }
    );
    Ok(())
}

#[then("the delete_file call awaits confirmation")]
fn delete_awaits_confirmation(world: &ConfirmationWorld) -> Result<(), eyre::Report> {
    let call = resolved_call(world, "delete_file")?;
    assert_eq!(call.state, ToolCallState::InputAvailable);
    let outcome = world
        .outcome
        .as_ref()
        .ok_or_else(|| eyre!("the orchestrator has not run"))?;
    assert!(outcome.awaits_confirmation());
    assert!(world.events.iter().any(|event| event.tool_call_id() == Some(&call.tool_call_id)));
    Ok(())
}

#[then("no confirmation is pending")]
fn nothing_pending(world: &ConfirmationWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .outcome
        .as_ref()
        .ok_or_else(|| eyre!("the orchestrator has not run"))?;
    assert!(!outcome.awaits_confirmation());
    Ok(())
}

#[scenario(
    path = "tests/features/tool_confirmation.feature",
    name = "Automatic tools run while gated tools wait"
)]
#[tokio::test(flavor = "multi_thread")]
async fn automatic_and_gated_tools(world: ConfirmationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_confirmation.feature",
    name = "A denied call records the denial"
)]
#[tokio::test(flavor = "multi_thread")]
async fn denied_call(world: ConfirmationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_confirmation.feature",
    name = "An approved call runs its approval handler"
)]
#[tokio::test(flavor = "multi_thread")]
async fn approved_call(world: ConfirmationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/tool_confirmation.feature",
    name = "An unknown tool fails without stopping its siblings"
)]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_tool(world: ConfirmationWorld) {
    let _ = world;
}
