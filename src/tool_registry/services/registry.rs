//! Immutable tool registry and the descriptors it holds.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::tool_registry::{
    domain::{ToolDefinition, ToolRegistryDomainError},
    ports::ToolExecutor,
};

/// A registered tool: its definition plus how it is executed.
///
/// A descriptor without an automatic executor is confirmation-gated. Its
/// optional approval handler runs only after a human approves a call.
#[derive(Clone)]
pub struct ToolDescriptor {
    definition: ToolDefinition,
    executor: Option<Arc<dyn ToolExecutor>>,
    on_approval: Option<Arc<dyn ToolExecutor>>,
}

impl ToolDescriptor {
    /// Creates a tool that runs automatically whenever it is called.
    #[must_use]
    pub fn automatic(definition: ToolDefinition, executor: Arc<dyn ToolExecutor>) -> Self {
        Self {
            definition,
            executor: Some(executor),
            on_approval: None,
        }
    }

    /// Creates a tool that requires a human decision before it runs.
    #[must_use]
    pub const fn requires_confirmation(definition: ToolDefinition) -> Self {
        Self {
            definition,
            executor: None,
            on_approval: None,
        }
    }

    /// Sets the executor run once a gated call is approved.
    #[must_use]
    pub fn with_approval_handler(mut self, handler: Arc<dyn ToolExecutor>) -> Self {
        self.on_approval = Some(handler);
        self
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Returns the tool definition.
    #[must_use]
    pub const fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Returns the automatic executor, if any.
    #[must_use]
    pub fn executor(&self) -> Option<&Arc<dyn ToolExecutor>> {
        self.executor.as_ref()
    }

    /// Returns the approval handler, if any.
    #[must_use]
    pub fn approval_handler(&self) -> Option<&Arc<dyn ToolExecutor>> {
        self.on_approval.as_ref()
    }

    /// Returns `true` when calls must wait for a human decision.
    #[must_use]
    pub const fn requires_human_confirmation(&self) -> bool {
        self.executor.is_none()
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.definition.name())
            .field("automatic", &self.executor.is_some())
            .field("approval_handler", &self.on_approval.is_some())
            .finish()
    }
}

/// Read-only mapping from tool name to descriptor.
///
/// Built once through [`ToolRegistryBuilder`] and shared behind an [`Arc`];
/// lookups need no locking.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use turnstile::tool_registry::domain::ToolDefinition;
/// use turnstile::tool_registry::services::{ToolDescriptor, ToolRegistry};
/// use serde_json::json;
///
/// let delete_file = ToolDefinition::new("delete_file", "Deletes a file", json!({}))
///     .expect("valid definition");
/// let registry = ToolRegistry::builder()
///     .register(ToolDescriptor::requires_confirmation(delete_file))
///     .expect("unique name")
///     .build();
///
/// let descriptor = registry.lookup("delete_file").expect("registered");
/// assert!(descriptor.requires_human_confirmation());
/// assert!(registry.lookup("unknown").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Finds a tool by exact name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).and_then(|&slot| self.tools.get(slot))
    }

    /// Returns definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(ToolDescriptor::definition)
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns `true` if no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Accumulates descriptors before the registry is frozen.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    registry: ToolRegistry,
}

impl ToolRegistryBuilder {
    /// Adds one tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::DuplicateTool`] when a tool with the
    /// same name is already registered.
    pub fn register(mut self, descriptor: ToolDescriptor) -> Result<Self, ToolRegistryDomainError> {
        let name = descriptor.name().to_owned();
        if self.registry.index.contains_key(&name) {
            return Err(ToolRegistryDomainError::DuplicateTool(name));
        }
        self.registry.index.insert(name, self.registry.tools.len());
        self.registry.tools.push(descriptor);
        Ok(self)
    }

    /// Merges an additional tool set, such as tools discovered from an
    /// external server. Names already present may not be shadowed.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::DuplicateTool`] on the first clash.
    pub fn extend(
        self,
        descriptors: impl IntoIterator<Item = ToolDescriptor>,
    ) -> Result<Self, ToolRegistryDomainError> {
        descriptors
            .into_iter()
            .try_fold(self, |builder, descriptor| builder.register(descriptor))
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ToolRegistry {
        self.registry
    }
}
