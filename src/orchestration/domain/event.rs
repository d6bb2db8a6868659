//! Events delivered to the client over the merged output stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::domain::ToolCallId;

/// Progress of a single tool call as reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolPhase {
    /// The call is gated and waits for a human decision.
    AwaitingConfirmation,
    /// The call produced an output.
    Completed,
    /// The call failed or targeted an unknown tool.
    Failed,
    /// A human refused the call.
    Denied,
}

impl ToolPhase {
    /// Returns the wire name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingConfirmation => "awaiting-confirmation",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Denied => "denied",
        }
    }
}

/// Result payload carried by a `tool-result` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ToolOutcome {
    /// The tool's output.
    Output {
        /// Structured output value.
        output: Value,
    },
    /// The failure detail.
    Error {
        /// Human-readable error text.
        error_text: String,
    },
}

/// One unit of the ordered output stream.
///
/// # Serialisation
///
/// ```json
/// { "type": "token-delta", "text": "Hel" }
/// { "type": "tool-status", "tool_call_id": "c1", "tool_name": "calculator", "phase": "completed" }
/// { "type": "tool-result", "tool_call_id": "c1", "outcome": "output", "output": 12 }
/// { "type": "done" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// A fragment of generated text.
    TokenDelta {
        /// The text fragment.
        text: String,
    },
    /// The generation step declared a new tool call.
    ToolInput {
        /// Identifier of the declared call.
        tool_call_id: ToolCallId,
        /// Requested tool.
        tool_name: String,
        /// Complete call input.
        input: Value,
    },
    /// A tool call changed phase.
    ToolStatus {
        /// Identifier of the call.
        tool_call_id: ToolCallId,
        /// Requested tool.
        tool_name: String,
        /// The new phase.
        phase: ToolPhase,
    },
    /// A tool call resolved.
    ToolResult {
        /// Identifier of the call.
        tool_call_id: ToolCallId,
        /// Output or error.
        #[serde(flatten)]
        outcome: ToolOutcome,
    },
    /// Terminal marker; always the final event of a run.
    Done,
}

impl StreamEvent {
    /// Returns `true` for [`StreamEvent::Done`].
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns the tool call this event refers to, if any.
    #[must_use]
    pub const fn tool_call_id(&self) -> Option<&ToolCallId> {
        match self {
            Self::ToolInput { tool_call_id, .. }
            | Self::ToolStatus { tool_call_id, .. }
            | Self::ToolResult { tool_call_id, .. } => Some(tool_call_id),
            Self::TokenDelta { .. } | Self::Done => None,
        }
    }
}
