//! Generation provider adapters.

mod scripted;

pub use scripted::{ScriptedGenerationProvider, ScriptedResponse};
