//! Session shell around the pipeline.
//!
//! A [`ChatSession`] owns one conversation's stored history, accepts inbound
//! requests and scheduled-task firings, and runs the orchestration pipeline
//! for each, one at a time. [`AgentConfig`] supplies model parameters, the
//! step budget and the system prompt template.

mod chat;
mod config;
mod scheduled;

pub use chat::{ChatRequest, ChatSession, HistoryUpdate, SessionError};
pub use config::{
    AgentConfig, ConfigError, MAX_OUTPUT_TOKENS_ENV, MAX_STEPS_ENV, MODEL_ENV, TEMPERATURE_ENV,
};
pub use scheduled::{SCHEDULED_TASK_PREFIX, ScheduledTaskBridge, scheduled_task_message};

#[cfg(test)]
mod tests;
