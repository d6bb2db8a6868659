//! Message format and history repair for turnstile.
//!
//! This module implements the message types exchanged between clients, the
//! tool-call orchestrator, and generation providers, plus the sanitizer that
//! makes an interrupted history safe to resend.
//!
//! # Architecture
//!
//! The module follows hexagonal architecture principles:
//!
//! - **Domain**: Pure domain types ([`domain::Message`], [`domain::Role`], [`domain::Part`], etc.)
//! - **Ports**: Abstract trait interfaces ([`ports::store::ConversationStore`])
//! - **Adapters**: Concrete implementations ([`adapters::memory::InMemoryConversationStore`])
//! - **Services**: History repair ([`services::sanitize`])
//!
//! # Example
//!
//! ```
//! use turnstile::message::domain::{Message, Part, Role};
//! use turnstile::message::services::sanitize;
//! use mockable::DefaultClock;
//!
//! let message = Message::new(Role::User, vec![Part::text("Hello!")], &DefaultClock)
//!     .expect("valid message");
//! let history = sanitize(&[message]);
//! assert_eq!(history.len(), 1);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
