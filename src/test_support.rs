//! Shared builders for unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::Value;

use crate::message::domain::{
    Message, Part, Role, ToolCallPart, ToolCallState, ToolDecisionPart,
};

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(2026, 3, 14, 9)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn message(id: &str, role: Role, parts: Vec<Part>) -> Message {
    Message::builder(role)
        .with_id(id)
        .with_parts(parts)
        .build(&FixedClock::default())
        .expect("valid message")
}

pub fn call(id: &str, tool_name: &str, input: Value, state: ToolCallState) -> Part {
    Part::ToolCall(ToolCallPart::new(id, tool_name, input).with_state(state))
}

pub fn pending_call(id: &str, tool_name: &str, input: Value) -> Part {
    call(id, tool_name, input, ToolCallState::InputAvailable)
}

pub fn approve(id: &str) -> Part {
    Part::ToolDecision(ToolDecisionPart::approve(id))
}

pub fn deny(id: &str, reason: Option<&str>) -> Part {
    Part::ToolDecision(ToolDecisionPart::deny(id, reason.map(str::to_owned)))
}

/// Returns the tool call at `part_index` of the message at `message_index`.
pub fn call_at(history: &[Message], message_index: usize, part_index: usize) -> &ToolCallPart {
    history
        .get(message_index)
        .and_then(|message| message.parts().get(part_index))
        .and_then(Part::as_tool_call)
        .expect("tool call part")
}
