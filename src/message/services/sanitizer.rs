//! History repair applied before a history is resent to a generation step.
//!
//! Interrupted turns leave tool calls behind that a provider would reject:
//! inputs that never finished streaming, or calls that were neither executed
//! nor answered by a human. [`sanitize`] removes them, together with any
//! decision that would be left without its call.

use std::collections::HashSet;

use crate::message::domain::{Message, Part, Role, ToolCallId, ToolCallState};

/// Returns a copy of `history` that is safe to send to a generation step.
///
/// Rules, applied per part while preserving message and part order:
///
/// 1. `input-streaming` calls are dropped.
/// 2. `input-available` calls are kept only while still live: the call
///    belongs to the latest assistant message, and either a later message
///    carries a decision for it or that assistant message ends the history.
///    Calls left pending in a superseded turn are dropped even when decided,
///    since only the latest turn is ever orchestrated.
/// 3. Decisions are kept only when their call precedes them in the result.
/// 4. Messages left without parts are dropped.
///
/// The function is pure and idempotent. An empty result is valid; callers
/// still generate with only the system context.
///
/// # Examples
///
/// ```
/// use turnstile::message::domain::{Message, Part, Role, ToolCallPart, ToolCallState};
/// use turnstile::message::services::sanitize;
/// use mockable::DefaultClock;
/// use serde_json::json;
///
/// let call = ToolCallPart::new("c1", "calculator", json!({}))
///     .with_state(ToolCallState::InputStreaming);
/// let history = vec![
///     Message::new(Role::Assistant, vec![Part::text("Working"), Part::ToolCall(call)], &DefaultClock)
///         .expect("valid message"),
/// ];
///
/// let sanitized = sanitize(&history);
/// assert_eq!(sanitized[0].parts().len(), 1);
/// ```
#[must_use]
pub fn sanitize(history: &[Message]) -> Vec<Message> {
    let live_calls = retained_calls(history);

    let mut seen_calls: HashSet<ToolCallId> = HashSet::new();
    history
        .iter()
        .enumerate()
        .filter_map(|(index, message)| {
            let parts: Vec<Part> = message
                .parts()
                .iter()
                .filter(|part| match part {
                    Part::Text(_) => true,
                    Part::ToolCall(call) => {
                        let keep = match call.state {
                            ToolCallState::InputStreaming => false,
                            ToolCallState::InputAvailable => {
                                live_calls.contains(&(index, &call.tool_call_id))
                            }
                            ToolCallState::OutputAvailable { .. }
                            | ToolCallState::OutputError { .. } => true,
                        };
                        if keep {
                            seen_calls.insert(call.tool_call_id.clone());
                        }
                        keep
                    }
                    Part::ToolDecision(decision) => seen_calls.contains(&decision.tool_call_id),
                })
                .cloned()
                .collect();

            (!parts.is_empty()).then(|| message.clone().with_parts(parts))
        })
        .collect()
}

/// Collects the `(message index, call id)` pairs of `input-available` calls
/// that are still live.
fn retained_calls(history: &[Message]) -> HashSet<(usize, &ToolCallId)> {
    let last_index = history.len().saturating_sub(1);
    let latest_turn = history
        .iter()
        .rposition(|message| message.role() == Role::Assistant);
    let mut decided_later: HashSet<&ToolCallId> = HashSet::new();
    let mut live = HashSet::new();

    for (index, message) in history.iter().enumerate().rev() {
        for call in message.tool_calls() {
            if call.state == ToolCallState::InputAvailable
                && latest_turn == Some(index)
                && (index == last_index || decided_later.contains(&call.tool_call_id))
            {
                live.insert((index, &call.tool_call_id));
            }
        }
        decided_later.extend(
            message
                .parts()
                .iter()
                .filter_map(Part::as_tool_decision)
                .map(|decision| &decision.tool_call_id),
        );
    }

    live
}
