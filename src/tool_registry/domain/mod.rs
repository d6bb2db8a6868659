//! Domain model for tool definitions and input validation.
//!
//! Executors and registry wiring remain outside this boundary.

mod error;
mod schema;
mod tool;

pub use error::{SchemaViolation, ToolRegistryDomainError};
pub use schema::validate_input;
pub use tool::ToolDefinition;
