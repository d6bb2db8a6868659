//! Entry point for tasks fired by an external scheduler.
//!
//! A firing is just another message source: it appends a user message and
//! runs the normal pipeline.

use mockable::Clock;

use crate::message::domain::{Message, MessageBuilderError, Part, Role};
use crate::orchestration::services::EventStream;

/// Prefix of the synthetic user message recorded when a task fires.
pub const SCHEDULED_TASK_PREFIX: &str = "Running scheduled task: ";

/// Hook invoked by an external scheduler when a task is due.
pub trait ScheduledTaskBridge: Send + Sync {
    /// Appends the task message to history and starts a pipeline run,
    /// returning its event stream.
    fn on_scheduled_fire(&self, description: &str) -> EventStream;
}

/// Builds the user message recorded for a fired task, stamped by `clock`.
///
/// # Errors
///
/// Propagates [`MessageBuilderError`]; a single text part never triggers it.
///
/// # Examples
///
/// ```
/// use mockable::DefaultClock;
/// use turnstile::message::domain::Role;
/// use turnstile::session::scheduled_task_message;
///
/// let message = scheduled_task_message("water the plants", &DefaultClock)
///     .expect("valid message");
/// assert_eq!(message.role(), Role::User);
/// ```
pub fn scheduled_task_message(
    description: &str,
    clock: &impl Clock,
) -> Result<Message, MessageBuilderError> {
    Message::builder(Role::User)
        .with_part(Part::text(format!("{SCHEDULED_TASK_PREFIX}{description}")))
        .build(clock)
}
