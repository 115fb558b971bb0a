//! Game agents: immutable role descriptors addressed to the completion gateway.
//!
//! - [`Agent`]: name, model id, and fully-resolved instructions.
//! - [`prompt`]: role preambles, the `{topic}` placeholder, and the
//!   baseline/alternate instruction fragments used by the sweeps.

pub mod prompt;

pub use prompt::{default_guessing_instructions, default_host_instructions};

use crate::config::GameConfig;
use crate::game::GameParameters;

/// An immutable role in one game.
///
/// `name` doubles as the transcript role tag, so the two agents of a game
/// must have distinct names. `instructions` is resolved once at
/// construction; nothing about an agent changes during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    name: String,
    model: String,
    instructions: String,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        model: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            instructions: instructions.into(),
        }
    }

    /// The host for a game: knows the topic.
    pub fn host(params: &GameParameters, config: &GameConfig) -> Self {
        Self::new(
            config.host_name.clone(),
            config.host_model.clone(),
            prompt::host_instructions(&params.topic, &params.host_agent_additional_instructions),
        )
    }

    /// The guesser for a game: never sees the topic.
    pub fn guesser(params: &GameParameters, config: &GameConfig) -> Self {
        Self::new(
            config.guesser_name.clone(),
            config.guesser_model.clone(),
            prompt::guesser_instructions(&params.guessing_agent_additional_instructions),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}
