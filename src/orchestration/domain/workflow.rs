//! Projection of stream events into an ordered list of workflow steps.
//!
//! Backs a status panel: one step per tool call, updated as events arrive.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::{StreamEvent, ToolPhase};
use crate::message::domain::ToolCallId;

/// Display status of a workflow step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Waiting on a human.
    Pending,
    /// Executing.
    Running,
    /// Finished with an output.
    Completed,
    /// Failed or denied.
    Failed,
}

impl From<ToolPhase> for StepStatus {
    fn from(phase: ToolPhase) -> Self {
        match phase {
            ToolPhase::AwaitingConfirmation => Self::Pending,
            ToolPhase::Completed => Self::Completed,
            ToolPhase::Failed | ToolPhase::Denied => Self::Failed,
        }
    }
}

/// One tool call as shown in the status panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// The tool call this step tracks.
    pub id: ToolCallId,
    /// Tool name.
    pub name: String,
    /// Current status.
    pub status: StepStatus,
    /// When the status last changed.
    pub timestamp: DateTime<Utc>,
}

/// Folds [`StreamEvent`]s into [`WorkflowStep`]s, keeping first-seen order.
///
/// # Examples
///
/// ```
/// use mockable::DefaultClock;
/// use turnstile::orchestration::domain::{StepStatus, StreamEvent, ToolPhase, WorkflowTracker};
///
/// let mut tracker = WorkflowTracker::default();
/// tracker.observe(
///     &StreamEvent::ToolStatus {
///         tool_call_id: "c1".into(),
///         tool_name: "delete_file".to_owned(),
///         phase: ToolPhase::AwaitingConfirmation,
///     },
///     &DefaultClock,
/// );
/// assert_eq!(tracker.steps()[0].status, StepStatus::Pending);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkflowTracker {
    steps: Vec<WorkflowStep>,
}

impl WorkflowTracker {
    /// Applies one event. Events without a tool call are ignored.
    pub fn observe(&mut self, event: &StreamEvent, clock: &impl Clock) {
        match event {
            StreamEvent::ToolInput {
                tool_call_id,
                tool_name,
                ..
            } => self.upsert(tool_call_id, tool_name, StepStatus::Running, clock.utc()),
            StreamEvent::ToolStatus {
                tool_call_id,
                tool_name,
                phase,
            } => self.upsert(tool_call_id, tool_name, (*phase).into(), clock.utc()),
            StreamEvent::TokenDelta { .. } | StreamEvent::ToolResult { .. } | StreamEvent::Done => {}
        }
    }

    /// Returns the steps in the order their calls first appeared.
    #[must_use]
    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    fn upsert(
        &mut self,
        id: &ToolCallId,
        name: &str,
        status: StepStatus,
        timestamp: DateTime<Utc>,
    ) {
        if let Some(step) = self.steps.iter_mut().find(|step| &step.id == id) {
            step.status = status;
            step.timestamp = timestamp;
            return;
        }
        self.steps.push(WorkflowStep {
            id: id.clone(),
            name: name.to_owned(),
            status,
            timestamp,
        });
    }
}
