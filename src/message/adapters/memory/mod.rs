//! In-memory adapter implementations.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! tests and local deployments without a database.

mod conversation;

pub use conversation::InMemoryConversationStore;
