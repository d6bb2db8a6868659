//! Port contracts for the generation step.

mod generation;

pub use generation::{
    GenerationChunk, GenerationError, GenerationProvider, GenerationRequest, GenerationSettings,
    GenerationStream,
};

#[cfg(test)]
pub use generation::MockGenerationProvider;
