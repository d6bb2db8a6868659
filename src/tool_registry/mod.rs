//! Tool registry for turnstile.
//!
//! Tools are registered once at process start and are read-only afterwards.
//! Each tool pairs a schema-carrying [`domain::ToolDefinition`] with an
//! optional automatic executor; a tool without one is confirmation-gated and
//! only runs after a human approves the call. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - The immutable registry in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
