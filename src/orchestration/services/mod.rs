//! Orchestration services: the event channel, tool-call orchestrator,
//! prompt rendering and the stream merger that ties them together.

mod merger;
mod orchestrator;
mod prompt;
mod sink;

pub use merger::{DEFAULT_MAX_STEPS, StreamMerger};
pub use orchestrator::ToolCallOrchestrator;
pub use prompt::{DEFAULT_SYSTEM_TEMPLATE, SCHEDULE_GUIDANCE, SystemPrompt};
pub use sink::{EventSink, EventStream};
