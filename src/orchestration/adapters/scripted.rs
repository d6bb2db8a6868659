//! Generation provider that replays pre-recorded responses.
//!
//! Used by the replay binary and by tests that need a deterministic model.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};

use crate::orchestration::ports::{
    GenerationChunk, GenerationError, GenerationProvider, GenerationRequest, GenerationStream,
};

/// One scripted response: the chunks to stream, optionally followed by a
/// mid-stream failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptedResponse {
    chunks: Vec<GenerationChunk>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
}

impl ScriptedResponse {
    /// Streams `chunks` and then finishes.
    #[must_use]
    pub const fn new(chunks: Vec<GenerationChunk>) -> Self {
        Self {
            chunks,
            failure: None,
        }
    }

    /// A response that is only text.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![GenerationChunk::TextDelta { text: text.into() }])
    }

    /// Breaks the stream with `message` after the scripted chunks.
    #[must_use]
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    fn into_stream(self) -> GenerationStream {
        let failure = self
            .failure
            .map(|message| Err(GenerationError::Stream(message)));
        let items: Vec<Result<GenerationChunk, GenerationError>> =
            self.chunks.into_iter().map(Ok).chain(failure).collect();
        stream::iter(items).boxed()
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    responses: VecDeque<ScriptedResponse>,
    requests: Vec<GenerationRequest>,
}

/// Replays queued responses in order and records every request.
///
/// Running out of responses is a request error, which ends the run the same
/// way a provider outage would.
#[derive(Debug, Clone, Default)]
pub struct ScriptedGenerationProvider {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedGenerationProvider {
    /// Creates a provider that answers with `responses`, one per request.
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                responses: responses.into_iter().collect(),
                requests: Vec::new(),
            })),
        }
    }

    /// Returns the requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerationProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationStream, GenerationError> {
        let response = {
            let mut state = self
                .state
                .lock()
                .map_err(|_| GenerationError::Request("script lock poisoned".to_owned()))?;
            state.requests.push(request);
            state.responses.pop_front()
        };
        response
            .map(ScriptedResponse::into_stream)
            .ok_or_else(|| GenerationError::Request("no scripted response left".to_owned()))
    }
}
