//! Replays a recorded conversation through the pipeline and prints the
//! resulting stream events as NDJSON.
//!
//! Usage:
//!
//! ```text
//! turnstile-replay <transcript-path | ->
//! ```
//!
//! `-` reads the transcript from stdin. A transcript supplies the history,
//! the scripted model responses, optional configuration, and any
//! confirmation-gated tools the history refers to:
//!
//! ```json
//! {
//!   "config": { "max_steps": 3 },
//!   "gated_tools": [
//!     { "name": "delete_file", "description": "Deletes a file",
//!       "input_schema": { "type": "object" } }
//!   ],
//!   "history": [
//!     { "id": "u1", "role": "user",
//!       "parts": [{ "type": "text", "text": "multiply 3 and 4" }],
//!       "metadata": { "createdAt": "2026-03-14T09:00:00Z" } }
//!   ],
//!   "responses": [
//!     { "chunks": [{ "type": "tool-call", "tool_call_id": "g1",
//!                    "tool_name": "calculator",
//!                    "input": { "operation": "multiply", "a": 3, "b": 4 } }] },
//!     { "chunks": [{ "type": "text-delta", "text": "It is 12." }] }
//!   ]
//! }
//! ```
//!
//! Built-in tools are always registered. Logs go to stderr; set
//! `TURNSTILE_LOG_FORMAT=json` for JSON log lines.

use std::io::{self, Read, Write};
use std::sync::Arc;

use futures::StreamExt;
use mockable::DefaultClock;
use serde::Deserialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use turnstile::message::domain::Message;
use turnstile::orchestration::adapters::{ScriptedGenerationProvider, ScriptedResponse};
use turnstile::orchestration::domain::StreamEvent;
use turnstile::orchestration::services::{EventSink, StreamMerger};
use turnstile::session::{AgentConfig, ConfigError};
use turnstile::telemetry::{LogFormat, init_tracing};
use turnstile::tool_registry::adapters::builtin_tools;
use turnstile::tool_registry::domain::{ToolDefinition, ToolRegistryDomainError};
use turnstile::tool_registry::services::{ToolDescriptor, ToolRegistry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while replaying a transcript.
#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: turnstile-replay <transcript-path | ->")]
    Usage,

    #[error("failed to read transcript: {0}")]
    Read(#[source] io::Error),

    #[error("invalid transcript: {0}")]
    Parse(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] ToolRegistryDomainError),

    #[error("failed to initialise async runtime: {0}")]
    RuntimeInit(#[source] io::Error),

    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write event: {0}")]
    Write(#[source] io::Error),
}

#[derive(Debug, Deserialize)]
struct Transcript {
    #[serde(default)]
    config: AgentConfig,
    #[serde(default)]
    gated_tools: Vec<ToolDefinition>,
    history: Vec<Message>,
    #[serde(default)]
    responses: Vec<ScriptedResponse>,
}

fn main() -> Result<(), BoxError> {
    let format = match std::env::var("TURNSTILE_LOG_FORMAT").as_deref() {
        Ok("json") => LogFormat::Json,
        _ => LogFormat::Compact,
    };
    if !init_tracing(format) {
        return Err("tracing subscriber already installed".into());
    }

    let source = parse_args(std::env::args().skip(1))?;
    let transcript = load_transcript(&read_source(&source)?)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ReplayError::RuntimeInit)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    runtime.block_on(replay(transcript, &mut out))?;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<String, ReplayError> {
    match (args.next(), args.next()) {
        (Some(source), None) => Ok(source),
        _ => Err(ReplayError::Usage),
    }
}

fn read_source(source: &str) -> Result<String, ReplayError> {
    if source == "-" {
        let mut document = String::new();
        io::stdin()
            .read_to_string(&mut document)
            .map_err(ReplayError::Read)?;
        return Ok(document);
    }
    std::fs::read_to_string(source).map_err(ReplayError::Read)
}

fn load_transcript(document: &str) -> Result<Transcript, ReplayError> {
    let mut transcript: Transcript = serde_json::from_str(document).map_err(ReplayError::Parse)?;
    transcript.config = transcript.config.with_env_overrides()?;
    Ok(transcript)
}

fn build_registry(gated_tools: Vec<ToolDefinition>) -> Result<ToolRegistry, ReplayError> {
    let registry = ToolRegistry::builder()
        .extend(builtin_tools(DefaultClock)?)?
        .extend(gated_tools.into_iter().map(ToolDescriptor::requires_confirmation))?
        .build();
    Ok(registry)
}

async fn replay(transcript: Transcript, out: &mut impl Write) -> Result<(), ReplayError> {
    let Transcript {
        config,
        gated_tools,
        history,
        responses,
    } = transcript;
    let registry = build_registry(gated_tools)?;
    let merger = StreamMerger::new(
        Arc::new(ScriptedGenerationProvider::new(responses)),
        Arc::new(registry),
        DefaultClock,
    )
    .with_settings(config.generation.clone())
    .with_prompt(config.system_prompt())
    .with_max_steps(config.max_steps);

    let (sink, stream) = EventSink::channel();
    let messages = merger.run(&history, sink, &CancellationToken::new()).await;
    tracing::info!(messages = messages.len(), "replay finished");
    let events: Vec<StreamEvent> = stream.collect().await;
    write_events(&events, out)
}

fn write_events(events: &[StreamEvent], out: &mut impl Write) -> Result<(), ReplayError> {
    for event in events {
        let line = serde_json::to_string(event).map_err(ReplayError::Encode)?;
        writeln!(out, "{line}").map_err(ReplayError::Write)?;
    }
    out.flush().map_err(ReplayError::Write)
}
