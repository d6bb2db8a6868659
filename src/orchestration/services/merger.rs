//! One pipeline run: sanitize, orchestrate, generate, repeat.

use std::sync::Arc;

use futures::StreamExt;
use mockable::Clock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{EventSink, SystemPrompt, ToolCallOrchestrator};
use crate::message::domain::{Message, Part, Role, ToolCallPart};
use crate::message::services::sanitize;
use crate::orchestration::{
    domain::StreamEvent,
    error::PipelineError,
    ports::{GenerationChunk, GenerationError, GenerationProvider, GenerationRequest, GenerationSettings},
};
use crate::tool_registry::services::ToolRegistry;

/// Default number of generation calls allowed in one run.
pub const DEFAULT_MAX_STEPS: usize = 5;

/// Drives the orchestrator and the generation step into one event stream.
///
/// Orchestrator events for a turn are always emitted before generation for
/// that turn starts. A run that reaches a pending confirmation, a
/// cancellation, or a provider failure stops there; every run ends with a
/// single `done`.
pub struct StreamMerger<P: ?Sized, C> {
    provider: Arc<P>,
    orchestrator: ToolCallOrchestrator,
    prompt: SystemPrompt,
    settings: GenerationSettings,
    max_steps: usize,
    clock: C,
}

impl<P, C> StreamMerger<P, C>
where
    P: GenerationProvider + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a merger with default settings and prompt.
    #[must_use]
    pub fn new(provider: Arc<P>, registry: Arc<ToolRegistry>, clock: C) -> Self {
        Self {
            provider,
            orchestrator: ToolCallOrchestrator::new(registry),
            prompt: SystemPrompt::default(),
            settings: GenerationSettings::default(),
            max_steps: DEFAULT_MAX_STEPS,
            clock,
        }
    }

    /// Sets the model parameters.
    #[must_use]
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the system instruction template.
    #[must_use]
    pub fn with_prompt(mut self, prompt: SystemPrompt) -> Self {
        self.prompt = prompt;
        self
    }

    /// Caps generation calls per run. Zero is treated as one.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Returns the clock used for timestamps.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Runs the pipeline over `history`, terminates the stream, and returns
    /// the history to persist.
    ///
    /// Consumes `sink`, so `done` is emitted exactly once whatever happens.
    pub async fn run(
        &self,
        history: &[Message],
        sink: EventSink,
        cancel: &CancellationToken,
    ) -> Vec<Message> {
        let messages = self.execute(history, &sink, cancel).await;
        sink.finish();
        messages
    }

    /// Runs the pipeline without emitting `done`, for callers that must do
    /// more work (such as persisting history) before terminating the stream.
    ///
    /// Errors are logged and end the run early; the history produced so far
    /// is still returned.
    pub async fn execute(
        &self,
        history: &[Message],
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> Vec<Message> {
        let mut messages = sanitize(history);
        debug!(
            received = history.len(),
            retained = messages.len(),
            "history sanitized"
        );

        if let Err(err) = self.drive(&mut messages, sink, cancel).await {
            error!(error = %err, "pipeline run ended early");
        }
        messages
    }

    async fn drive(
        &self,
        messages: &mut Vec<Message>,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<(), PipelineError> {
        if !self.orchestrate(messages, sink, cancel).await {
            return Ok(());
        }

        let system = self.prompt.render(&self.clock)?;
        for step in 1..=self.max_steps {
            if cancel.is_cancelled() {
                info!(step, "run cancelled before generation");
                return Ok(());
            }

            let request = GenerationRequest {
                system: system.clone(),
                messages: messages.clone(),
                tools: self.orchestrator.registry().definitions().cloned().collect(),
                settings: self.settings.clone(),
            };
            let mut draft = TurnDraft::default();
            let streamed = self.stream_turn(request, &mut draft, sink, cancel).await;
            let declared_calls = draft.declared_calls();
            if let Some(message) = draft.into_message(&self.clock) {
                messages.push(message);
            }
            streamed?;

            if declared_calls == 0 {
                return Ok(());
            }
            debug!(step, declared_calls, "model declared tool calls");
            if !self.orchestrate(messages, sink, cancel).await {
                return Ok(());
            }
        }

        warn!(max_steps = self.max_steps, "step budget exhausted");
        Ok(())
    }

    /// Orchestrates the latest turn in place. Returns `false` when the run
    /// must stop: a confirmation is pending or the run was cancelled.
    async fn orchestrate(
        &self,
        messages: &mut Vec<Message>,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> bool {
        let outcome = self
            .orchestrator
            .process(std::mem::take(messages), sink, cancel)
            .await;
        *messages = outcome.messages;

        if !outcome.pending.is_empty() {
            info!(
                pending = outcome.pending.len(),
                "awaiting human confirmation; run ends here"
            );
            return false;
        }
        if cancel.is_cancelled() {
            info!("run cancelled during orchestration");
            return false;
        }
        true
    }

    async fn stream_turn(
        &self,
        request: GenerationRequest,
        draft: &mut TurnDraft,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> Result<(), GenerationError> {
        let mut stream = self.provider.generate(request).await?;
        loop {
            let next = tokio::select! {
                () = cancel.cancelled() => {
                    info!("generation cancelled");
                    return Ok(());
                }
                next = stream.next() => next,
            };

            match next {
                None | Some(Ok(GenerationChunk::Finished)) => return Ok(()),
                Some(Err(err)) => return Err(err),
                Some(Ok(GenerationChunk::TextDelta { text })) => {
                    draft.push_text(&text);
                    sink.emit(StreamEvent::TokenDelta { text });
                }
                Some(Ok(GenerationChunk::ToolCall {
                    tool_call_id,
                    tool_name,
                    input,
                })) => {
                    sink.emit(StreamEvent::ToolInput {
                        tool_call_id: tool_call_id.clone(),
                        tool_name: tool_name.clone(),
                        input: input.clone(),
                    });
                    draft.push_call(ToolCallPart::new(tool_call_id, tool_name, input));
                }
            }
        }
    }
}

/// Assistant response accumulated while streaming, in arrival order.
#[derive(Debug, Default)]
struct TurnDraft {
    parts: Vec<Part>,
}

impl TurnDraft {
    fn push_text(&mut self, text: &str) {
        if let Some(Part::Text(last)) = self.parts.last_mut() {
            last.text.push_str(text);
        } else {
            self.parts.push(Part::text(text));
        }
    }

    fn push_call(&mut self, call: ToolCallPart) {
        self.parts.push(Part::ToolCall(call));
    }

    fn declared_calls(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| part.as_tool_call().is_some())
            .count()
    }

    /// Returns `None` when nothing was streamed.
    fn into_message(self, clock: &impl Clock) -> Option<Message> {
        Message::builder(Role::Assistant)
            .with_parts(self.parts)
            .build(clock)
            .ok()
    }
}
