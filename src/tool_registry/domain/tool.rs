//! Tool definition value object.

use super::ToolRegistryDomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata advertised to the generation step for one tool.
///
/// # Examples
///
/// ```
/// use turnstile::tool_registry::domain::ToolDefinition;
/// use serde_json::json;
///
/// let definition = ToolDefinition::new(
///     "calculator",
///     "Performs arithmetic",
///     json!({"type": "object"}),
/// )
/// .expect("valid definition");
/// assert_eq!(definition.name(), "calculator");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: Value,
}

impl ToolDefinition {
    /// Creates a tool definition.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when the name or description is
    /// empty, or the schema is not a JSON object.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolName);
        }

        let normalized_description = description.into().trim().to_owned();
        if normalized_description.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolDescription);
        }

        if !input_schema.is_object() {
            return Err(ToolRegistryDomainError::InvalidInputSchema(normalized_name));
        }

        Ok(Self {
            name: normalized_name,
            description: normalized_description,
            input_schema,
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }
}
