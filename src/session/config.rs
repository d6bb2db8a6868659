//! Agent configuration: model parameters, step budget and prompt template.
//!
//! Loaded from JSON and then overlaid from environment variables, so
//! deployments can adjust the model without editing files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::orchestration::ports::GenerationSettings;
use crate::orchestration::services::{DEFAULT_MAX_STEPS, DEFAULT_SYSTEM_TEMPLATE, SystemPrompt};

/// Overrides [`GenerationSettings::model`].
pub const MODEL_ENV: &str = "TURNSTILE_MODEL";
/// Overrides [`GenerationSettings::temperature`].
pub const TEMPERATURE_ENV: &str = "TURNSTILE_TEMPERATURE";
/// Overrides [`GenerationSettings::max_output_tokens`].
pub const MAX_OUTPUT_TOKENS_ENV: &str = "TURNSTILE_MAX_OUTPUT_TOKENS";
/// Overrides [`AgentConfig::max_steps`].
pub const MAX_STEPS_ENV: &str = "TURNSTILE_MAX_STEPS";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },

    /// The configuration document is not valid.
    #[error("invalid config document: {0}")]
    Parse(String),

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {variable}: {reason}")]
    InvalidOverride {
        /// Variable name.
        variable: &'static str,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },
}

/// Runtime configuration of the agent.
///
/// # Examples
///
/// ```
/// use turnstile::session::AgentConfig;
///
/// let config = AgentConfig::from_json(r#"{"max_steps": 3}"#).expect("valid config");
/// assert_eq!(config.max_steps, 3);
/// assert_eq!(config.generation.model, "gpt-4o-mini");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Model parameters.
    pub generation: GenerationSettings,
    /// Generation calls allowed per run.
    pub max_steps: usize,
    /// `minijinja` source of the system instruction.
    pub system_template: String,
    /// Environment variable holding the provider API key.
    pub api_key_env: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationSettings::default(),
            max_steps: DEFAULT_MAX_STEPS,
            system_template: DEFAULT_SYSTEM_TEMPLATE.to_owned(),
            api_key_env: "OPENAI_API_KEY".to_owned(),
        }
    }
}

impl AgentConfig {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(document).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads and parses a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = path.as_ref();
        let document = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.to_path_buf(),
            source: Arc::new(source),
        })?;
        Self::from_json(&document)
    }

    /// Applies `TURNSTILE_*` overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for unparsable values.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for unparsable values.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(model) = lookup(MODEL_ENV).filter(|value| !value.trim().is_empty()) {
            self.generation.model = model.trim().to_owned();
        }
        if let Some(temperature) = parse_override(&lookup, TEMPERATURE_ENV)? {
            self.generation.temperature = temperature;
        }
        if let Some(max_output_tokens) = parse_override(&lookup, MAX_OUTPUT_TOKENS_ENV)? {
            self.generation.max_output_tokens = max_output_tokens;
        }
        if let Some(max_steps) = parse_override(&lookup, MAX_STEPS_ENV)? {
            self.max_steps = max_steps;
        }
        Ok(self)
    }

    /// Reports whether the API key variable is set and non-empty.
    #[must_use]
    pub fn credentials_present(&self) -> bool {
        std::env::var(&self.api_key_env).is_ok_and(|key| !key.trim().is_empty())
    }

    /// Logs a warning when the API key is missing. Never fails.
    pub fn warn_if_credentials_missing(&self) {
        if !self.credentials_present() {
            warn!(
                variable = %self.api_key_env,
                "provider API key is not set; generation requests will likely fail"
            );
        }
    }

    /// Returns the system prompt built from the template.
    #[must_use]
    pub fn system_prompt(&self) -> SystemPrompt {
        SystemPrompt::new(self.system_template.clone())
    }
}

fn parse_override<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(variable) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|err: T::Err| ConfigError::InvalidOverride {
            variable,
            value: raw.clone(),
            reason: err.to_string(),
        })
}
