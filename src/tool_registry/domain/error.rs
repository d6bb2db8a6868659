//! Error types for tool registry domain validation.

use thiserror::Error;

/// Errors returned while constructing tool registry values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// A tool definition name is empty after trimming.
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// A tool definition description is empty after trimming.
    #[error("tool description must not be empty")]
    EmptyToolDescription,

    /// The input schema is not a JSON object.
    #[error("input schema for tool '{0}' must be a JSON object")]
    InvalidInputSchema(String),

    /// A tool with the same name is already registered.
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// A tool input that does not satisfy the tool's input schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaViolation {
    /// The schema expects an object but the input is something else.
    #[error("input must be a JSON object")]
    NotAnObject,

    /// A required property is absent.
    #[error("missing required property '{0}'")]
    MissingProperty(String),

    /// A property has the wrong JSON type.
    #[error("property '{property}' must be of type {expected}")]
    WrongType {
        /// Property name.
        property: String,
        /// Type named by the schema.
        expected: String,
    },
}
