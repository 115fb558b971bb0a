use serde::{Deserialize, Serialize};

use super::transcript::Transcript;

/// Outcome of one finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    /// Fresh UUID v4 per run.
    pub id: String,
    pub success: bool,
    /// Guesser turns taken. `None` when a run was interrupted before the
    /// guesser spoke.
    pub number_of_questions: Option<u32>,
    #[serde(rename = "chatHistory")]
    pub transcript: Transcript,
}

impl GameResult {
    /// Equality ignoring `id`, for comparing two runs of the same game.
    pub fn same_play(&self, other: &GameResult) -> bool {
        self.success == other.success
            && self.number_of_questions == other.number_of_questions
            && self.transcript == other.transcript
    }
}
