//! The persisted per-variant evaluation record.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::harness::EvalError;
use super::stats::Summary;
use crate::game::{GameParameters, GameResult};

/// Aggregate plus raw results for one variant, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    /// Name of the varied parameter, e.g. `guessing_agent_temperature`.
    pub parameter: String,
    /// The value it was set to, as JSON.
    pub value: serde_json::Value,
    pub n_runs: usize,
    pub confidence: f64,
    pub success_rate: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub mean_number_of_questions: Option<f64>,
    #[serde(default)]
    pub failed_trials: usize,
    pub created_at: DateTime<Utc>,
    pub game_variables: GameParameters,
    pub game_results: Vec<GameResult>,
}

impl EvaluationRecord {
    pub fn new(
        parameter: impl Into<String>,
        value: serde_json::Value,
        confidence: f64,
        failed_trials: usize,
        game_variables: GameParameters,
        game_results: Vec<GameResult>,
    ) -> Self {
        let summary = Summary::from_results(&game_results, confidence);
        Self {
            parameter: parameter.into(),
            value,
            n_runs: summary.trials,
            confidence,
            success_rate: summary.success_rate,
            ci_lower: summary.ci_lower,
            ci_upper: summary.ci_upper,
            mean_number_of_questions: summary.mean_number_of_questions,
            failed_trials,
            created_at: Utc::now(),
            game_variables,
            game_results,
        }
    }

    /// `<dir>/test_results_<parameter>_<value>.json`. The same variant
    /// always maps to the same path.
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(file_name(&self.parameter, &self.value))
    }

    /// Write the record as pretty JSON, replacing any previous file for the
    /// same variant. Returns the path written.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, EvalError> {
        std::fs::create_dir_all(dir)?;
        let path = self.path_in(dir);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// File name for a variant.
pub fn file_name(parameter: &str, value: &serde_json::Value) -> String {
    let raw = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    format!("test_results_{}_{}.json", slug(parameter), slug(&raw))
}

/// Filename-safe form of `s`: ASCII alphanumerics, `.` and `-` are kept,
/// everything else collapses into single underscores, and the result is
/// capped at 64 characters.
fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.trim().chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed: String = out.trim_matches('_').chars().take(64).collect();
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Transcript;
    use serde_json::json;

    fn won(questions: u32) -> GameResult {
        GameResult {
            id: "x".into(),
            success: true,
            number_of_questions: Some(questions),
            transcript: Transcript::new(),
        }
    }

    #[test]
    fn file_names_are_stable_and_safe() {
        assert_eq!(
            file_name("guessing_agent_temperature", &json!(0.2)),
            "test_results_guessing_agent_temperature_0.2.json"
        );
        assert_eq!(
            file_name("topic", &json!("polar bear")),
            "test_results_topic_polar_bear.json"
        );
        let long_prompt = json!("You are a careful guesser. Ask yes/no questions!\nBe brief.");
        let name = file_name("guessingAgentAdditionalInstructions", &long_prompt);
        assert!(!name.contains('/'));
        assert!(!name.contains('\n'));
        assert!(!name.contains(' '));
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let record = EvaluationRecord::new(
            "topic",
            json!("apple"),
            0.95,
            0,
            GameParameters::new("apple"),
            vec![won(3), won(5)],
        );
        let value = serde_json::to_value(&record).unwrap();
        for key in [
            "parameter",
            "value",
            "nRuns",
            "confidence",
            "successRate",
            "ciLower",
            "ciUpper",
            "meanNumberOfQuestions",
            "failedTrials",
            "createdAt",
            "gameVariables",
            "gameResults",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["nRuns"], 2);
        assert_eq!(value["meanNumberOfQuestions"], 4.0);
        assert_eq!(value["gameVariables"]["topic"], "apple");
    }

    #[test]
    fn write_to_overwrites_same_variant() {
        let dir = tempfile::tempdir().unwrap();
        let first = EvaluationRecord::new(
            "topic",
            json!("apple"),
            0.95,
            0,
            GameParameters::new("apple"),
            vec![won(3)],
        );
        let path = first.write_to(dir.path()).unwrap();
        let second = EvaluationRecord::new(
            "topic",
            json!("apple"),
            0.95,
            0,
            GameParameters::new("apple"),
            vec![won(3), won(7)],
        );
        assert_eq!(second.write_to(dir.path()).unwrap(), path);

        let loaded: EvaluationRecord =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.n_runs, 2);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
