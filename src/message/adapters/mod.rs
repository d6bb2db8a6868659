//! Persistence adapters for the message module.
//!
//! This module provides concrete implementations of the [`ConversationStore`]
//! port. Adapters handle all infrastructure concerns while the domain remains
//! pure.
//!
//! # Available Adapters
//!
//! - [`memory::InMemoryConversationStore`]: Thread-safe in-memory storage for
//!   tests and single-process deployments
//!
//! [`ConversationStore`]: crate::message::ports::store::ConversationStore

pub mod memory;
