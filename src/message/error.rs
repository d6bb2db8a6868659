//! Error types for message persistence.
//!
//! Uses `thiserror` for typed variants that callers can inspect.

use super::domain::{MessageId, SessionId};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while loading or saving a session history.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Two messages in the history share an identifier.
    #[error("duplicate message {message_id} in session {session_id}")]
    DuplicateMessage {
        /// The session whose history was rejected.
        session_id: SessionId,
        /// The repeated identifier.
        message_id: MessageId,
    },

    /// The backing store failed.
    #[error("storage error: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),

    /// A connection or lock error occurred.
    #[error("connection error: {0}")]
    Connection(String),
}

impl StoreError {
    /// Wraps a backing-store failure.
    #[must_use]
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage(Arc::new(err))
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}
