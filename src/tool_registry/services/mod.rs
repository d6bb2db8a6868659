//! Registry service for looking up tools by name.

mod registry;

pub use registry::{ToolDescriptor, ToolRegistry, ToolRegistryBuilder};
