//! Win detection: did the guesser name the topic?
//!
//! The topic must appear as a whole word (or whole phrase, for multi-word
//! topics), ignoring case. "PENGUIN!" matches `penguin`; "penguins" does not.

use regex::{Regex, RegexBuilder};

/// Compiled whole-word, case-insensitive matcher for one topic.
#[derive(Debug, Clone)]
pub struct TopicMatcher {
    topic: String,
    pattern: Regex,
}

impl TopicMatcher {
    /// Build a matcher for `topic`. The topic is matched literally; regex
    /// metacharacters in it have no special meaning. Fails only if the
    /// topic is too large for the regex engine's size limits.
    pub fn new(topic: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(&format!(r"\b{}\b", regex::escape(topic)))
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            topic: topic.to_string(),
            pattern,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether `utterance` names the topic.
    pub fn is_match(&self, utterance: &str) -> bool {
        self.pattern.is_match(utterance)
    }
}
