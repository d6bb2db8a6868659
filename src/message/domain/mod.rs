//! Domain types for the message subsystem.
//!
//! This module contains pure domain types with no infrastructure dependencies.
//! All types are serialisable via serde.

mod content;
mod ids;
mod message;
mod role;

pub use content::{
    APPROVAL_CONFIRMED, APPROVAL_DENIED, ConfirmationDecision, Part, TextPart, ToolCallPart,
    ToolCallState, ToolDecisionPart,
};
pub use ids::{MessageId, SessionId, ToolCallId};
pub use message::{Message, MessageBuilder, MessageBuilderError, MessageMetadata};
pub use role::{ParseRoleError, Role};
