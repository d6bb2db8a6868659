//! Tool-call orchestration and stream merging.
//!
//! A pipeline run sanitizes history, resolves the latest assistant turn's
//! tool calls, then alternates generation and orchestration until the model
//! stops calling tools. Everything the client sees goes through one
//! append-only [`services::EventSink`].
//!
//! - Domain types in [`domain`]
//! - The generation boundary in [`ports`]
//! - Provider adapters in [`adapters`]
//! - Orchestrator and merger in [`services`]

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
