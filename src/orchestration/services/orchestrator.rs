//! Resolution of the tool calls in the latest assistant turn.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::EventSink;
use crate::message::domain::{
    APPROVAL_CONFIRMED, APPROVAL_DENIED, ConfirmationDecision, Message, Part, Role, ToolCallId,
    ToolCallPart, ToolCallState,
};
use crate::orchestration::domain::{
    OrchestrationOutcome, PendingConfirmation, StreamEvent, ToolOutcome, ToolPhase,
};
use crate::tool_registry::{
    domain::validate_input,
    ports::ToolExecutor,
    services::{ToolDescriptor, ToolRegistry},
};

/// Executes automatic tools and stages confirmation-gated ones.
///
/// Calls run one at a time in positional order. A failure is recorded
/// against the call that produced it and never stops its siblings.
#[derive(Debug, Clone)]
pub struct ToolCallOrchestrator {
    registry: Arc<ToolRegistry>,
}

impl ToolCallOrchestrator {
    /// Creates an orchestrator over a frozen registry.
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry consulted for every call.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Resolves the unresolved calls of the most recent assistant message.
    ///
    /// Decisions are read from messages after that assistant message. Parts
    /// keep their positions; only call state changes. Once `cancel` fires no
    /// further call is touched and the rest stay `input-available`.
    pub async fn process(
        &self,
        mut messages: Vec<Message>,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> OrchestrationOutcome {
        let Some(turn) = messages
            .iter()
            .rposition(|message| message.role() == Role::Assistant)
        else {
            return OrchestrationOutcome::unchanged(messages);
        };
        let decisions = decisions_after(messages.get(turn + 1..).unwrap_or_default());
        let Some(assistant) = messages
            .get_mut(turn)
            .filter(|message| message.has_tool_calls())
        else {
            return OrchestrationOutcome::unchanged(messages);
        };

        let mut pending = Vec::new();
        for part in assistant.parts_mut() {
            let Part::ToolCall(call) = part else {
                continue;
            };
            if call.state != ToolCallState::InputAvailable {
                continue;
            }
            if cancel.is_cancelled() {
                info!(tool_call_id = %call.tool_call_id, "cancelled before tool execution");
                break;
            }
            let decision = decisions.get(&call.tool_call_id);
            if let Some(waiting) = self.resolve(call, decision, sink).await {
                pending.push(waiting);
            }
        }

        OrchestrationOutcome { messages, pending }
    }

    async fn resolve(
        &self,
        call: &mut ToolCallPart,
        decision: Option<&ConfirmationDecision>,
        sink: &EventSink,
    ) -> Option<PendingConfirmation> {
        let Some(descriptor) = self.registry.lookup(&call.tool_name) else {
            warn!(
                tool_call_id = %call.tool_call_id,
                tool_name = %call.tool_name,
                "tool call targets an unknown tool"
            );
            let error_text = format!("unknown tool '{}'", call.tool_name);
            record_error(call, ToolPhase::Failed, error_text, sink);
            return None;
        };

        if let Some(executor) = descriptor.executor() {
            run_executor(call, descriptor, executor.as_ref(), sink).await;
            return None;
        }

        match decision {
            None => {
                info!(
                    tool_call_id = %call.tool_call_id,
                    tool_name = %call.tool_name,
                    "tool call awaiting confirmation"
                );
                emit_status(call, ToolPhase::AwaitingConfirmation, sink);
                Some(PendingConfirmation::from(&*call))
            }
            Some(ConfirmationDecision::Denied { reason }) => {
                info!(tool_call_id = %call.tool_call_id, "tool call denied");
                let error_text = reason.as_deref().map_or_else(
                    || APPROVAL_DENIED.to_owned(),
                    |reason| format!("{APPROVAL_DENIED}: {reason}"),
                );
                record_error(call, ToolPhase::Denied, error_text, sink);
                None
            }
            Some(ConfirmationDecision::Approved) => {
                info!(tool_call_id = %call.tool_call_id, "tool call approved");
                match descriptor.approval_handler() {
                    Some(handler) => run_executor(call, descriptor, handler.as_ref(), sink).await,
                    None => record_output(call, Value::from(APPROVAL_CONFIRMED), sink),
                }
                None
            }
        }
    }
}

/// Collects decisions by call id; the first decision for an id wins.
fn decisions_after(messages: &[Message]) -> HashMap<ToolCallId, ConfirmationDecision> {
    let mut decisions = HashMap::new();
    for part in messages
        .iter()
        .filter(|message| message.role() == Role::User)
        .flat_map(Message::parts)
    {
        if let Some(decision) = part.as_tool_decision() {
            decisions
                .entry(decision.tool_call_id.clone())
                .or_insert_with(|| decision.decision.clone());
        }
    }
    decisions
}

async fn run_executor(
    call: &mut ToolCallPart,
    descriptor: &ToolDescriptor,
    executor: &dyn ToolExecutor,
    sink: &EventSink,
) {
    if let Err(violation) = validate_input(descriptor.definition().input_schema(), &call.input) {
        warn!(
            tool_call_id = %call.tool_call_id,
            tool_name = %call.tool_name,
            %violation,
            "tool input rejected by schema"
        );
        let error_text = format!("invalid input for tool '{}': {violation}", call.tool_name);
        record_error(call, ToolPhase::Failed, error_text, sink);
        return;
    }

    debug!(tool_call_id = %call.tool_call_id, tool_name = %call.tool_name, "executing tool");
    match executor.execute(&call.input).await {
        Ok(output) => {
            info!(tool_call_id = %call.tool_call_id, tool_name = %call.tool_name, "tool call completed");
            record_output(call, output, sink);
        }
        Err(err) => {
            warn!(
                tool_call_id = %call.tool_call_id,
                tool_name = %call.tool_name,
                error = %err,
                "tool call failed"
            );
            record_error(call, ToolPhase::Failed, err.to_string(), sink);
        }
    }
}

fn emit_status(call: &ToolCallPart, phase: ToolPhase, sink: &EventSink) {
    sink.emit(StreamEvent::ToolStatus {
        tool_call_id: call.tool_call_id.clone(),
        tool_name: call.tool_name.clone(),
        phase,
    });
}

fn record_output(call: &mut ToolCallPart, output: Value, sink: &EventSink) {
    call.resolve_output(output.clone());
    emit_status(call, ToolPhase::Completed, sink);
    sink.emit(StreamEvent::ToolResult {
        tool_call_id: call.tool_call_id.clone(),
        outcome: ToolOutcome::Output { output },
    });
}

fn record_error(call: &mut ToolCallPart, phase: ToolPhase, error_text: String, sink: &EventSink) {
    call.resolve_error(error_text.clone());
    emit_status(call, phase, sink);
    sink.emit(StreamEvent::ToolResult {
        tool_call_id: call.tool_call_id.clone(),
        outcome: ToolOutcome::Error { error_text },
    });
}
