//! The chat session shell: owns a history and serialises pipeline runs.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use super::config::AgentConfig;
use super::scheduled::{ScheduledTaskBridge, scheduled_task_message};
use crate::message::{
    domain::{Message, MessageBuilderError, MessageId, SessionId},
    error::StoreError,
    ports::store::ConversationStore,
};
use crate::orchestration::{
    ports::GenerationProvider,
    services::{EventSink, EventStream, StreamMerger},
};
use crate::tool_registry::services::ToolRegistry;

/// Errors surfaced by a session.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The request addressed another session.
    #[error("request for session {requested} routed to session {session}")]
    SessionMismatch {
        /// The session that received the request.
        session: SessionId,
        /// The session named by the request.
        requested: SessionId,
    },

    /// The history to run would repeat a message identifier.
    #[error("message {message_id} appears twice in session {session}")]
    DuplicateMessage {
        /// The session whose run was refused.
        session: SessionId,
        /// The repeated identifier.
        message_id: MessageId,
    },

    /// The history store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A synthetic message could not be built.
    #[error(transparent)]
    Message(#[from] MessageBuilderError),
}

/// How an inbound request updates the stored history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryUpdate {
    /// Replaces the stored history.
    Full(Vec<Message>),
    /// Appends to the stored history.
    Incremental(Vec<Message>),
}

/// An inbound chat request routed to one session.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The addressed session.
    pub session_id: SessionId,
    /// History carried by the request.
    pub history: HistoryUpdate,
    /// Abort signal for the resulting run.
    pub cancel: CancellationToken,
}

impl ChatRequest {
    /// A request carrying the whole history.
    #[must_use]
    pub fn full(session_id: SessionId, messages: Vec<Message>) -> Self {
        Self {
            session_id,
            history: HistoryUpdate::Full(messages),
            cancel: CancellationToken::new(),
        }
    }

    /// A request carrying only new messages.
    #[must_use]
    pub fn incremental(session_id: SessionId, messages: Vec<Message>) -> Self {
        Self {
            session_id,
            history: HistoryUpdate::Incremental(messages),
            cancel: CancellationToken::new(),
        }
    }

    /// Attaches an abort signal.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

struct SessionInner<S, P: ?Sized, C> {
    id: SessionId,
    store: S,
    merger: StreamMerger<P, C>,
    run_lock: Mutex<()>,
}

/// One conversation: its stored history and the pipeline that extends it.
///
/// At most one run is in flight per session; concurrent requests queue on an
/// async lock and each sees the history the previous run saved. `done` is
/// emitted only after the resulting history is persisted.
pub struct ChatSession<S, P: ?Sized, C> {
    inner: Arc<SessionInner<S, P, C>>,
}

impl<S, P: ?Sized, C> Clone for ChatSession<S, P, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, P, C> ChatSession<S, P, C>
where
    S: ConversationStore + 'static,
    P: GenerationProvider + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a session around an assembled pipeline.
    #[must_use]
    pub fn new(id: SessionId, store: S, merger: StreamMerger<P, C>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                id,
                store,
                merger,
                run_lock: Mutex::new(()),
            }),
        }
    }

    /// Creates a session whose pipeline is configured from `config`.
    ///
    /// A missing provider key is logged, never fatal.
    #[must_use]
    pub fn from_config(
        id: SessionId,
        store: S,
        provider: Arc<P>,
        registry: Arc<ToolRegistry>,
        clock: C,
        config: &AgentConfig,
    ) -> Self {
        config.warn_if_credentials_missing();
        let merger = StreamMerger::new(provider, registry, clock)
            .with_settings(config.generation.clone())
            .with_prompt(config.system_prompt())
            .with_max_steps(config.max_steps);
        Self::new(id, store, merger)
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    /// Loads the stored history.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store fails.
    pub async fn history(&self) -> Result<Vec<Message>, SessionError> {
        Ok(self.inner.store.load(self.inner.id).await?)
    }

    /// Accepts a request and starts its run in the background.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionMismatch`] if the request names another
    /// session. Failures after the run starts are logged and the stream still
    /// ends with `done`.
    pub fn handle_request(&self, request: ChatRequest) -> Result<EventStream, SessionError> {
        self.check_session(request.session_id)?;
        let (sink, stream) = EventSink::channel();
        let session = self.clone();
        let span = info_span!("chat_run", session_id = %self.inner.id);
        tokio::spawn(
            async move {
                if let Err(err) = session.run(request, sink).await {
                    error!(error = %err, "chat run failed");
                }
            }
            .instrument(span),
        );
        Ok(stream)
    }

    /// Runs one request to completion, emitting into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] on a session mismatch, a repeated message id,
    /// or a store failure; the sink is finished either way.
    pub async fn run(&self, request: ChatRequest, sink: EventSink) -> Result<Vec<Message>, SessionError> {
        if let Err(err) = self.check_session(request.session_id) {
            sink.finish();
            return Err(err);
        }
        let ChatRequest {
            history, cancel, ..
        } = request;

        let _guard = self.inner.run_lock.lock().await;
        let stored = match history {
            HistoryUpdate::Full(messages) => messages,
            HistoryUpdate::Incremental(messages) => match self.inner.store.load(self.inner.id).await {
                Ok(mut stored) => {
                    stored.extend(messages);
                    stored
                }
                Err(err) => {
                    sink.finish();
                    return Err(err.into());
                }
            },
        };

        self.execute(&stored, sink, &cancel).await
    }

    /// Appends the scheduled-task message and runs the pipeline to completion.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the message cannot be built or the store
    /// fails; the sink is finished either way.
    pub async fn run_scheduled(
        &self,
        description: &str,
        sink: EventSink,
    ) -> Result<Vec<Message>, SessionError> {
        let message = match scheduled_task_message(description, self.inner.merger.clock()) {
            Ok(message) => message,
            Err(err) => {
                sink.finish();
                return Err(err.into());
            }
        };
        info!(session_id = %self.inner.id, description, "scheduled task fired");

        let _guard = self.inner.run_lock.lock().await;
        let mut stored = match self.inner.store.load(self.inner.id).await {
            Ok(stored) => stored,
            Err(err) => {
                sink.finish();
                return Err(err.into());
            }
        };
        stored.push(message);

        self.execute(&stored, sink, &CancellationToken::new()).await
    }

    /// Runs the merger, persists the result, then terminates the stream.
    /// Callers hold the run lock.
    ///
    /// A history with a repeated message id is refused before generation.
    async fn execute(
        &self,
        history: &[Message],
        sink: EventSink,
        cancel: &CancellationToken,
    ) -> Result<Vec<Message>, SessionError> {
        if let Some(message_id) = first_repeated_id(history) {
            warn!(
                session_id = %self.inner.id,
                %message_id,
                "history repeats a message id; run refused"
            );
            sink.finish();
            return Err(SessionError::DuplicateMessage {
                session: self.inner.id,
                message_id: message_id.clone(),
            });
        }

        let messages = self.inner.merger.execute(history, &sink, cancel).await;
        let saved = self.inner.store.save(self.inner.id, &messages).await;
        sink.finish();
        saved?;
        info!(
            session_id = %self.inner.id,
            messages = messages.len(),
            "history persisted"
        );
        Ok(messages)
    }

    fn check_session(&self, requested: SessionId) -> Result<(), SessionError> {
        if requested == self.inner.id {
            return Ok(());
        }
        Err(SessionError::SessionMismatch {
            session: self.inner.id,
            requested,
        })
    }
}

fn first_repeated_id(history: &[Message]) -> Option<&MessageId> {
    let mut seen = HashSet::with_capacity(history.len());
    history
        .iter()
        .map(Message::id)
        .find(|id| !seen.insert(*id))
}

impl<S, P, C> ScheduledTaskBridge for ChatSession<S, P, C>
where
    S: ConversationStore + 'static,
    P: GenerationProvider + ?Sized + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn on_scheduled_fire(&self, description: &str) -> EventStream {
        let (sink, stream) = EventSink::channel();
        let session = self.clone();
        let task = description.to_owned();
        let span = info_span!("scheduled_run", session_id = %self.inner.id);
        tokio::spawn(
            async move {
                if let Err(err) = session.run_scheduled(&task, sink).await {
                    error!(error = %err, "scheduled run failed");
                }
            }
            .instrument(span),
        );
        stream
    }
}
