//! The Message aggregate representing a single entry in a chat history.

use super::{MessageId, Part, Role, ToolCallPart};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Metadata recorded alongside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}

impl MessageMetadata {
    /// Creates metadata stamped with the clock's current time.
    #[must_use]
    pub fn now(clock: &impl Clock) -> Self {
        Self {
            created_at: clock.utc(),
        }
    }
}

/// A message within a chat session.
///
/// # Invariants
///
/// - `id` is unique within the owning session
/// - `parts` keep their conversation order; only tool-call state is ever
///   rewritten in place
///
/// # Examples
///
/// ```
/// use turnstile::message::domain::{Message, Part, Role};
/// use mockable::DefaultClock;
///
/// let message = Message::new(Role::User, vec![Part::text("Hello!")], &DefaultClock)
///     .expect("valid message");
/// assert_eq!(message.role(), Role::User);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    parts: Vec<Part>,
    metadata: MessageMetadata,
}

impl Message {
    /// Creates a message with a fresh identifier and the current timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`MessageBuilderError::EmptyParts`] if `parts` is empty.
    pub fn new(
        role: Role,
        parts: Vec<Part>,
        clock: &impl Clock,
    ) -> Result<Self, MessageBuilderError> {
        Self::builder(role).with_parts(parts).build(clock)
    }

    /// Returns a builder for constructing messages.
    #[must_use]
    pub fn builder(role: Role) -> MessageBuilder {
        MessageBuilder::new(role)
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the author role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the ordered parts.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Returns the parts for in-place state updates.
    pub fn parts_mut(&mut self) -> &mut [Part] {
        &mut self.parts
    }

    /// Returns the metadata.
    #[must_use]
    pub const fn metadata(&self) -> &MessageMetadata {
        &self.metadata
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.metadata.created_at
    }

    /// Iterates over the tool calls carried by this message.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCallPart> {
        self.parts.iter().filter_map(Part::as_tool_call)
    }

    /// Returns `true` if the message carries at least one tool call.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().next().is_some()
    }

    /// Rebuilds the message with a different part list, keeping identity and
    /// metadata.
    #[must_use]
    pub(crate) fn with_parts(self, parts: Vec<Part>) -> Self {
        Self { parts, ..self }
    }
}

/// Builder for constructing messages.
#[derive(Debug)]
pub struct MessageBuilder {
    id: Option<MessageId>,
    role: Role,
    parts: Vec<Part>,
    created_at: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    /// Creates a new message builder.
    #[must_use]
    pub const fn new(role: Role) -> Self {
        Self {
            id: None,
            role,
            parts: Vec::new(),
            created_at: None,
        }
    }

    /// Sets a specific message identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds a part.
    #[must_use]
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Adds multiple parts.
    #[must_use]
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = Part>) -> Self {
        self.parts.extend(parts);
        self
    }

    /// Overrides the creation timestamp instead of reading the clock.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`MessageBuilderError::EmptyParts`] if no parts were added.
    pub fn build(self, clock: &impl Clock) -> Result<Message, MessageBuilderError> {
        if self.parts.is_empty() {
            return Err(MessageBuilderError::EmptyParts);
        }

        let created_at = self.created_at.unwrap_or_else(|| clock.utc());
        Ok(Message {
            id: self.id.unwrap_or_default(),
            role: self.role,
            parts: self.parts,
            metadata: MessageMetadata { created_at },
        })
    }
}

/// Errors that can occur when building a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageBuilderError {
    /// The message has no parts.
    #[error("message must contain at least one part")]
    EmptyParts,
}
