//! Engine configuration with sensible defaults.
//!
//! [`GameConfig`] holds the settings that shape a run but are not part of the
//! game's parameters: which models play, the agents' names, the question
//! budget, and whether the host gets a closing remark.
//!
//! ```ignore
//! let config = GameConfig::default()
//!     .with_model("anthropic/claude-sonnet-4")
//!     .with_max_questions(10)
//!     .with_closing_remark(false);
//! ```

use crate::DEFAULT_MODEL;

/// Number of guesser turns allowed before the game is lost.
pub const DEFAULT_MAX_QUESTIONS: u32 = 20;

/// Settings for a single [`GameEngine`](crate::game::GameEngine) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Model for the host. Default: [`DEFAULT_MODEL`].
    pub host_model: String,
    /// Model for the guesser. Default: [`DEFAULT_MODEL`].
    pub guesser_model: String,
    /// Host display name and transcript tag. Default: `"Host Agent"`.
    pub host_name: String,
    /// Guesser display name and transcript tag. Default: `"Guessing Agent"`.
    pub guesser_name: String,
    /// The game is lost once the guesser has taken more turns than this.
    /// Default: `20`.
    pub max_questions: u32,
    /// Invoke the host once more after a win or a lost budget. Default: `true`.
    pub closing_remark: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            host_model: DEFAULT_MODEL.to_string(),
            guesser_model: DEFAULT_MODEL.to_string(),
            host_name: "Host Agent".to_string(),
            guesser_name: "Guessing Agent".to_string(),
            max_questions: DEFAULT_MAX_QUESTIONS,
            closing_remark: true,
        }
    }
}

impl GameConfig {
    /// Use the same model for both agents.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.host_model = model.clone();
        self.guesser_model = model;
        self
    }

    #[must_use]
    pub fn with_host_model(mut self, model: impl Into<String>) -> Self {
        self.host_model = model.into();
        self
    }

    #[must_use]
    pub fn with_guesser_model(mut self, model: impl Into<String>) -> Self {
        self.guesser_model = model.into();
        self
    }

    #[must_use]
    pub fn with_max_questions(mut self, max_questions: u32) -> Self {
        self.max_questions = max_questions;
        self
    }

    #[must_use]
    pub fn with_closing_remark(mut self, enabled: bool) -> Self {
        self.closing_remark = enabled;
        self
    }
}
