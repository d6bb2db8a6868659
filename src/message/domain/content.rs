//! Part types representing the polymorphic content of messages.
//!
//! Messages carry an ordered "parts" array mixing text, tool calls, and human
//! confirmation decisions. A tool call records its own lifecycle: the result
//! of an executed call is written back into the same part rather than into a
//! separate message.

use super::ToolCallId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text returned to the model when a gated call is approved and the tool has
/// no approval handler.
pub const APPROVAL_CONFIRMED: &str = "Yes, confirmed.";

/// Error text recorded when a human denies a gated call.
pub const APPROVAL_DENIED: &str = "User denied access to tool execution";

/// A single part within a message.
///
/// # Serialisation
///
/// Parts are serialised with a `type` tag field:
///
/// ```json
/// { "type": "text", "text": "Hello, world!" }
/// { "type": "tool_call", "tool_call_id": "c1", "tool_name": "calculator",
///   "input": {"a": 3}, "state": "input-available" }
/// { "type": "tool_decision", "tool_call_id": "c1",
///   "decision": { "outcome": "approved" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// Plain text content.
    Text(TextPart),
    /// A tool call requested by the assistant, with its lifecycle state.
    ToolCall(ToolCallPart),
    /// A human decision about a confirmation-gated tool call.
    ToolDecision(ToolDecisionPart),
}

impl Part {
    /// Shorthand for a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart::new(text))
    }

    /// Returns the tool call if this part is one.
    #[must_use]
    pub const fn as_tool_call(&self) -> Option<&ToolCallPart> {
        match self {
            Self::ToolCall(call) => Some(call),
            _ => None,
        }
    }

    /// Returns the decision if this part is one.
    #[must_use]
    pub const fn as_tool_decision(&self) -> Option<&ToolDecisionPart> {
        match self {
            Self::ToolDecision(decision) => Some(decision),
            _ => None,
        }
    }
}

/// Text content within a message.
///
/// # Examples
///
/// ```
/// use turnstile::message::domain::TextPart;
///
/// let text = TextPart::new("Hello!");
/// assert!(!text.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text content.
    pub text: String,
}

impl TextPart {
    /// Creates a new text part.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns `true` if the text content is empty or whitespace-only.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Lifecycle state of a tool call.
///
/// Resolved states carry their payload, so an output state without a result
/// cannot be constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ToolCallState {
    /// The model is still streaming the call's input.
    InputStreaming,
    /// The input is complete and the call awaits execution or a decision.
    InputAvailable,
    /// The call finished with an output.
    OutputAvailable {
        /// The tool's result payload.
        output: Value,
    },
    /// The call failed.
    OutputError {
        /// Human-readable failure detail.
        error_text: String,
    },
}

impl ToolCallState {
    /// Returns the canonical state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InputStreaming => "input-streaming",
            Self::InputAvailable => "input-available",
            Self::OutputAvailable { .. } => "output-available",
            Self::OutputError { .. } => "output-error",
        }
    }

    /// Returns `true` for `output-available` and `output-error`.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::OutputAvailable { .. } | Self::OutputError { .. })
    }
}

/// A tool call within an assistant message.
///
/// # Examples
///
/// ```
/// use turnstile::message::domain::ToolCallPart;
/// use serde_json::json;
///
/// let call = ToolCallPart::new("call-1", "calculator", json!({"a": 3, "b": 4}));
/// assert!(!call.is_resolved());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPart {
    /// Identifier correlating this call with its decision.
    pub tool_call_id: ToolCallId,
    /// Name of the requested tool.
    pub tool_name: String,
    /// Structured input for the tool.
    pub input: Value,
    /// Lifecycle state, including the result once resolved.
    #[serde(flatten)]
    pub state: ToolCallState,
}

impl ToolCallPart {
    /// Creates a call whose input is complete.
    #[must_use]
    pub fn new(
        tool_call_id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        input: Value,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            input,
            state: ToolCallState::InputAvailable,
        }
    }

    /// Replaces the lifecycle state.
    #[must_use]
    pub fn with_state(mut self, state: ToolCallState) -> Self {
        self.state = state;
        self
    }

    /// Returns `true` once the call carries an output or an error.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.state.is_resolved()
    }

    /// Records a successful result.
    pub fn resolve_output(&mut self, output: Value) {
        self.state = ToolCallState::OutputAvailable { output };
    }

    /// Records a failure.
    pub fn resolve_error(&mut self, error_text: impl Into<String>) {
        self.state = ToolCallState::OutputError {
            error_text: error_text.into(),
        };
    }
}

/// A human answer to a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConfirmationDecision {
    /// The call may run.
    Approved,
    /// The call must not run.
    Denied {
        /// Optional explanation shown to the model.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl ConfirmationDecision {
    /// Returns `true` for [`ConfirmationDecision::Approved`].
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// A decision message part referencing a gated tool call by identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDecisionPart {
    /// The call this decision answers.
    pub tool_call_id: ToolCallId,
    /// The human's answer.
    pub decision: ConfirmationDecision,
}

impl ToolDecisionPart {
    /// Approves the referenced call.
    #[must_use]
    pub fn approve(tool_call_id: impl Into<ToolCallId>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            decision: ConfirmationDecision::Approved,
        }
    }

    /// Denies the referenced call.
    #[must_use]
    pub fn deny(tool_call_id: impl Into<ToolCallId>, reason: Option<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            decision: ConfirmationDecision::Denied { reason },
        }
    }
}
