//! Deterministic gateway for tests and offline dry runs.
//!
//! [`ScriptedGateway`] answers every request from a pair of closures, one per
//! role. The closure receives the zero-based turn index of the agent being
//! invoked, derived from the request itself (the number of `assistant`
//! messages in its rendered transcript), so the gateway keeps no per-game
//! state and can be shared by any number of concurrent trials.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::gateway::{CompletionGateway, CompletionRequest, GatewayError, GatewayFuture};
use crate::MessageRole;
use crate::agent::prompt::HOST_PREAMBLE;

type Script = Box<dyn Fn(usize) -> Result<String, GatewayError> + Send + Sync>;

/// A gateway that replays scripted lines for the host and the guesser.
///
/// # Example
///
/// ```
/// use twentyq::api::ScriptedGateway;
///
/// // The guesser names the topic on its third question.
/// let gateway = ScriptedGateway::new(
///     |_| Ok("Yes.".to_string()),
///     |turn| Ok(if turn == 2 { "Is it a pear?".into() } else { "Is it a fruit?".into() }),
/// );
/// assert_eq!(gateway.calls(), 0);
/// ```
pub struct ScriptedGateway {
    host: Script,
    guesser: Script,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    /// Build a gateway from one closure per role.
    pub fn new(
        host: impl Fn(usize) -> Result<String, GatewayError> + Send + Sync + 'static,
        guesser: impl Fn(usize) -> Result<String, GatewayError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            host: Box::new(host),
            guesser: Box::new(guesser),
            calls: AtomicUsize::new(0),
        }
    }

    /// Both roles always answer with the same fixed line.
    pub fn constant(host: impl Into<String>, guesser: impl Into<String>) -> Self {
        let host = host.into();
        let guesser = guesser.into();
        Self::new(move |_| Ok(host.clone()), move |_| Ok(guesser.clone()))
    }

    /// Replay fixed lines in order. Running past the end of either list is a
    /// [`GatewayError::Script`] error.
    pub fn from_lines(host: Vec<String>, guesser: Vec<String>) -> Self {
        Self::new(
            move |turn| line_at(&host, "host", turn),
            move |turn| line_at(&guesser, "guesser", turn),
        )
    }

    /// Total number of completions served so far, across all games.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn line_at(lines: &[String], role: &str, turn: usize) -> Result<String, GatewayError> {
    lines
        .get(turn)
        .cloned()
        .ok_or_else(|| GatewayError::Script(format!("no {role} line for turn {turn}")))
}

impl CompletionGateway for ScriptedGateway {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let turn = request
            .transcript
            .iter()
            .filter(|m| m.role == MessageRole::Assistant)
            .count();
        let reply = if request.instructions.starts_with(HOST_PREAMBLE) {
            (self.host)(turn)
        } else {
            (self.guesser)(turn)
        };
        Box::pin(async move { reply })
    }
}
