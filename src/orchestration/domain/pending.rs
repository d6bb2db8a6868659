//! Confirmation-gated calls waiting on a human decision.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::domain::{Message, ToolCallId, ToolCallPart};

/// A gated call detected during orchestration with no decision yet.
///
/// Lives only until the run ends; the call itself stays `input-available` in
/// history and the eventual decision is recorded as a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// Identifier the decision must reference.
    pub tool_call_id: ToolCallId,
    /// Requested tool.
    pub tool_name: String,
    /// Input the tool would run with.
    pub input: Value,
}

impl From<&ToolCallPart> for PendingConfirmation {
    fn from(call: &ToolCallPart) -> Self {
        Self {
            tool_call_id: call.tool_call_id.clone(),
            tool_name: call.tool_name.clone(),
            input: call.input.clone(),
        }
    }
}

/// History after orchestration plus the calls still awaiting a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestrationOutcome {
    /// The history with resolved calls written back in place.
    pub messages: Vec<Message>,
    /// Gated calls left unresolved, in positional order.
    pub pending: Vec<PendingConfirmation>,
}

impl OrchestrationOutcome {
    /// Wraps a history that needed no orchestration.
    #[must_use]
    pub const fn unchanged(messages: Vec<Message>) -> Self {
        Self {
            messages,
            pending: Vec::new(),
        }
    }

    /// Returns `true` when at least one call waits for a human.
    #[must_use]
    pub fn awaits_confirmation(&self) -> bool {
        !self.pending.is_empty()
    }
}
