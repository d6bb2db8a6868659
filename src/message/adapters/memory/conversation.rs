//! In-memory implementation of the `ConversationStore` port.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::message::{
    domain::{Message, SessionId},
    error::StoreError,
    ports::store::{ConversationStore, StoreResult},
};

/// In-memory implementation of [`ConversationStore`].
///
/// Thread-safe via internal [`RwLock`]. Clones share the same storage.
///
/// # Example
///
/// ```
/// use turnstile::message::adapters::memory::InMemoryConversationStore;
///
/// let store = InMemoryConversationStore::new();
/// assert!(store.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct InMemoryConversationStore {
    sessions: Arc<RwLock<HashMap<SessionId, Vec<Message>>>>,
}

impl InMemoryConversationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sessions with a saved history.
    ///
    /// Returns `0` if the internal lock is poisoned. For error-propagating
    /// access, use the trait methods instead.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no session history is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ensure_unique_ids(session_id: SessionId, messages: &[Message]) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(messages.len());
    for message in messages {
        if !seen.insert(message.id()) {
            return Err(StoreError::DuplicateMessage {
                session_id,
                message_id: message.id().clone(),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(&self, session_id: SessionId) -> StoreResult<Vec<Message>> {
        let guard = self
            .sessions
            .read()
            .map_err(|e| StoreError::connection(format!("lock poisoned: {e}")))?;

        Ok(guard.get(&session_id).cloned().unwrap_or_default())
    }

    async fn save(&self, session_id: SessionId, messages: &[Message]) -> StoreResult<()> {
        ensure_unique_ids(session_id, messages)?;

        let mut guard = self
            .sessions
            .write()
            .map_err(|e| StoreError::connection(format!("lock poisoned: {e}")))?;

        guard.insert(session_id, messages.to_vec());
        Ok(())
    }
}
