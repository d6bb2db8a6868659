//! Store port for session message histories.
//!
//! Defines the abstract interface for loading and saving the ordered message
//! list owned by a chat session, allowing different persistence
//! implementations while the pipeline remains storage-agnostic.

use crate::message::{
    domain::{Message, SessionId},
    error::StoreError,
};
use async_trait::async_trait;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Port for session history persistence.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - Histories are returned in the order they were saved
/// - Message identifiers are unique within a saved history
/// - Concurrent access is handled safely
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the history of a session.
    ///
    /// Returns an empty vector for an unknown session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing store fails.
    async fn load(&self, session_id: SessionId) -> StoreResult<Vec<Message>>;

    /// Replaces the history of a session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateMessage`] if two messages share an
    /// identifier, or another [`StoreError`] if the backing store fails.
    async fn save(&self, session_id: SessionId, messages: &[Message]) -> StoreResult<()>;

    /// Appends messages to the end of a session history.
    ///
    /// # Errors
    ///
    /// Same as [`ConversationStore::save`].
    async fn append(&self, session_id: SessionId, messages: &[Message]) -> StoreResult<()> {
        let mut history = self.load(session_id).await?;
        history.extend_from_slice(messages);
        self.save(session_id, &history).await
    }
}
