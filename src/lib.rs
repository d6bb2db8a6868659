//! Turnstile: message sanitization and tool-call orchestration for a
//! conversational agent backend.
//!
//! A chat history arrives from a client, is cleaned of tool calls that can
//! never complete, and is handed to an orchestrator that runs automatic tools
//! and stages confirmation-gated ones for a human decision. The result is
//! merged with a streamed model response into one ordered event stream.
//!
//! # Architecture
//!
//! Each subsystem follows hexagonal architecture principles:
//!
//! - **Domain**: Pure values and rules with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, scripted)
//! - **Services**: Behaviour composed from domain values and ports
//!
//! # Modules
//!
//! - [`message`]: Conversation message model, sanitizer, and history store
//! - [`tool_registry`]: Tool definitions, executors, and the frozen registry
//! - [`orchestration`]: Tool-call orchestrator, stream merger, and events
//! - [`session`]: Per-session shell, configuration, and scheduled tasks
//! - [`telemetry`]: Tracing subscriber setup

pub mod message;
pub mod orchestration;
pub mod session;
pub mod telemetry;
pub mod tool_registry;

#[cfg(test)]
mod test_support;
