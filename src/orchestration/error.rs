//! Errors that end a pipeline run early.

use thiserror::Error;

use crate::orchestration::ports::GenerationError;

/// A failure that stops a run before the model finishes.
///
/// These never reach the client as a broken stream: the run logs them and
/// still terminates with `done`.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// The system instruction template failed to render.
    #[error("system prompt rendering failed: {0}")]
    Prompt(String),

    /// The generation provider failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
