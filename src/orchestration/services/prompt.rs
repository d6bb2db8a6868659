//! System instruction rendering.

use minijinja::Environment;
use mockable::Clock;
use serde_json::{Map, Value};

use crate::orchestration::error::PipelineError;

/// Built-in system instruction template.
pub const DEFAULT_SYSTEM_TEMPLATE: &str = "\
You are a helpful assistant.

Current date and time: {{ now }}

You can:
- Answer questions and have conversations
- Help with various tasks
- Use tools when needed (calculator, scheduling, etc.)

Be friendly, helpful, and conversational. Give complete, thoughtful responses.

{{ schedule_guidance }}";

/// Guidance injected as `schedule_guidance`.
pub const SCHEDULE_GUIDANCE: &str = "\
When the user asks for something to happen later, schedule a task instead of \
doing it now. Resolve relative times such as \"in 10 minutes\" or \"tomorrow \
at 9\" against the current date and time above, and describe the task in a \
short sentence that will make sense when it runs.";

/// A `minijinja` template rendered once per run.
///
/// The template sees `now` (RFC 3339, from the injected clock) and
/// `schedule_guidance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPrompt {
    template: String,
}

impl SystemPrompt {
    /// Wraps a template source.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Returns the template source.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Renders the instruction for the clock's current time.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Prompt`] when the template does not parse or
    /// render.
    pub fn render(&self, clock: &impl Clock) -> Result<String, PipelineError> {
        let environment = Environment::new();
        let mut context = Map::new();
        context.insert("now".to_owned(), Value::String(clock.utc().to_rfc3339()));
        context.insert(
            "schedule_guidance".to_owned(),
            Value::String(SCHEDULE_GUIDANCE.to_owned()),
        );
        environment
            .render_str(&self.template, context)
            .map_err(|error| PipelineError::Prompt(error.to_string()))
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_TEMPLATE)
    }
}
