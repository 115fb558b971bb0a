//! The shared, append-only log of a game.
//!
//! Entries are tagged with the speaking agent's name. When an agent is
//! invoked, [`Transcript::render_for`] maps the log into API messages from
//! that agent's point of view: its own lines become `assistant`, everything
//! else becomes `user`.

use serde::{Deserialize, Serialize};

use crate::Message;

/// One line of the game, tagged with the agent that said it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    pub role: String,
    pub content: String,
}

impl Utterance {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Append-only, ordered history of one game.
///
/// There is no way to remove or edit an entry; order is the turn history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<Utterance>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return a reference to it.
    pub fn push(&mut self, role: impl Into<String>, content: impl Into<String>) -> &Utterance {
        self.entries.push(Utterance::new(role, content));
        // Just pushed, so non-empty.
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[Utterance] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Utterance> {
        self.entries.last()
    }

    /// Number of lines spoken by `role`.
    pub fn count_by(&self, role: &str) -> usize {
        self.entries.iter().filter(|u| u.role == role).count()
    }

    /// The log as seen by `perspective`: its own lines as `assistant`,
    /// all other lines as `user`.
    pub fn render_for(&self, perspective: &str) -> Vec<Message> {
        self.entries
            .iter()
            .map(|u| {
                if u.role == perspective {
                    Message::assistant(&u.content)
                } else {
                    Message::user(&u.content)
                }
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Utterance;
    type IntoIter = std::slice::Iter<'a, Utterance>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
