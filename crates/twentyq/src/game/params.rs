//! What a caller supplies to start a game.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::engine::EngineError;
use crate::DEFAULT_TEMPERATURE;

/// Parameters of one game. Immutable once a run begins.
///
/// Serialized with camelCase keys; everything except `topic` has a default,
/// so a minimal JSON file is just `{"topic": "pear"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameParameters {
    /// The secret the host knows and the guesser must name.
    pub topic: String,
    #[serde(default = "default_temperature")]
    pub guessing_agent_temperature: f32,
    #[serde(default = "default_temperature")]
    pub host_agent_temperature: f32,
    /// Host prompt fragment; `{topic}` is replaced by the topic.
    #[serde(default)]
    pub host_agent_additional_instructions: String,
    /// Guesser prompt fragment, used verbatim.
    #[serde(default)]
    pub guessing_agent_additional_instructions: String,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl GameParameters {
    /// Parameters for `topic` with default temperatures and empty fragments.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            guessing_agent_temperature: DEFAULT_TEMPERATURE,
            host_agent_temperature: DEFAULT_TEMPERATURE,
            host_agent_additional_instructions: String::new(),
            guessing_agent_additional_instructions: String::new(),
        }
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidParameters(format!("failed to read '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            EngineError::InvalidParameters(format!("failed to parse '{}': {e}", path.display()))
        })
    }

    /// Reject parameters a game cannot be played with.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.topic.trim().is_empty() {
            return Err(EngineError::InvalidParameters(
                "topic must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    #[must_use]
    pub fn with_guessing_temperature(mut self, temperature: f32) -> Self {
        self.guessing_agent_temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_host_temperature(mut self, temperature: f32) -> Self {
        self.host_agent_temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_host_instructions(mut self, fragment: impl Into<String>) -> Self {
        self.host_agent_additional_instructions = fragment.into();
        self
    }

    #[must_use]
    pub fn with_guessing_instructions(mut self, fragment: impl Into<String>) -> Self {
        self.guessing_agent_additional_instructions = fragment.into();
        self
    }
}
