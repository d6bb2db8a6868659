//! Boundary to the external text-generation provider.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::message::domain::{Message, ToolCallId};
use crate::tool_registry::domain::ToolDefinition;

/// Model parameters handed to the provider with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Provider model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens per request.
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_owned(),
            temperature: 0.7,
            max_output_tokens: 1000,
        }
    }
}

/// Everything one generation call needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Rendered system instruction.
    pub system: String,
    /// Sanitized, tool-resolved history.
    pub messages: Vec<Message>,
    /// Tools the model may call.
    pub tools: Vec<ToolDefinition>,
    /// Model parameters.
    pub settings: GenerationSettings,
}

/// One item of the provider's response stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GenerationChunk {
    /// A fragment of response text.
    TextDelta {
        /// The fragment.
        text: String,
    },
    /// A fully formed tool call declared by the model.
    ToolCall {
        /// Provider-assigned call identifier.
        tool_call_id: ToolCallId,
        /// Requested tool.
        tool_name: String,
        /// Complete call input.
        input: Value,
    },
    /// The provider finished this response.
    Finished,
}

/// Streamed provider response.
pub type GenerationStream = BoxStream<'static, Result<GenerationChunk, GenerationError>>;

/// Errors surfaced by a generation provider.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// The request was rejected before streaming began.
    #[error("generation request failed: {0}")]
    Request(String),

    /// The response stream broke part-way.
    #[error("generation stream interrupted: {0}")]
    Stream(String),

    /// Transport or client failure.
    #[error("generation provider error: {0}")]
    Provider(Arc<dyn std::error::Error + Send + Sync>),
}

impl GenerationError {
    /// Wraps a transport or client error.
    #[must_use]
    pub fn provider(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Provider(Arc::new(err))
    }
}

/// Produces a streamed response for a conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Starts a generation call.
    async fn generate(&self, request: GenerationRequest)
    -> Result<GenerationStream, GenerationError>;
}
