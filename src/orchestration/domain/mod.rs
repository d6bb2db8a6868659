//! Domain types for orchestration: stream events, pending confirmations and
//! the workflow projection.

mod event;
mod pending;
mod workflow;

pub use event::{StreamEvent, ToolOutcome, ToolPhase};
pub use pending::{OrchestrationOutcome, PendingConfirmation};
pub use workflow::{StepStatus, WorkflowStep, WorkflowTracker};
