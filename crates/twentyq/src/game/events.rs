//! Events emitted by the [`GameEngine`](super::GameEngine) while it runs.
//!
//! Events are an observability side channel: they never influence the
//! outcome of a game. Callers implement [`EventHandler`] to print progress,
//! log, or collect metrics.
//!
//! # Choosing an event handler
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests, evaluation trials |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |
//! | Custom `impl EventHandler` | Full control (console output, metrics) |

use tracing::{debug, info};

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted during one game.
#[derive(Debug)]
pub enum GameEvent<'a> {
    /// The run is about to make its first call.
    GameStarted {
        id: &'a str,
        topic: &'a str,
        host: &'a str,
        guesser: &'a str,
    },
    /// An agent is about to be invoked. `turn` is 1-based per agent.
    TurnStarted { agent: &'a str, turn: u32 },
    /// An agent's reply was appended to the transcript.
    Utterance {
        agent: &'a str,
        content: &'a str,
        /// `true` for the host's closing remark after the game ended.
        closing: bool,
    },
    /// The guesser named the topic.
    Guessed { number_of_questions: u32 },
    /// The guesser ran out of questions.
    BudgetExhausted { max_questions: u32 },
    /// The run was cancelled from outside.
    Interrupted { transcript_len: usize },
    /// The result is final.
    Finished {
        success: bool,
        number_of_questions: Option<u32>,
    },
}

/// Handler for game events.
///
/// # Example
///
/// ```ignore
/// struct Printer;
///
/// impl EventHandler for Printer {
///     fn on_event(&self, event: &GameEvent<'_>) {
///         if let GameEvent::Utterance { agent, content, .. } = event {
///             println!("{agent}: {content}");
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &GameEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let GameEvent::Guessed { number_of_questions } = event {
///         println!("won in {number_of_questions}");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&GameEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&GameEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&GameEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &GameEvent<'_>) {
        (self.0)(event);
    }
}

/// Dispatches every event to each inner handler, in registration order.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with_if(verbose, ConsoleHandler);
/// ```
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Add a handler to the chain.
    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Conditionally add a handler to the chain.
    pub fn with_if(self, condition: bool, handler: impl EventHandler + 'static) -> Self {
        if condition { self.with(handler) } else { self }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &GameEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Logs events via `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &GameEvent<'_>) {
        match event {
            GameEvent::GameStarted {
                id,
                topic,
                host,
                guesser,
            } => {
                info!("Game {id} started: topic={topic:?}, host={host}, guesser={guesser}");
            }
            GameEvent::TurnStarted { agent, turn } => {
                debug!("[{agent} turn {turn}]");
            }
            GameEvent::Utterance {
                agent,
                content,
                closing,
            } => {
                let preview: String = content.chars().take(200).collect();
                debug!(
                    "{agent}{}: {preview}{}",
                    if *closing { " (closing)" } else { "" },
                    if content.chars().count() > 200 { "..." } else { "" }
                );
            }
            GameEvent::Guessed {
                number_of_questions,
            } => {
                info!("Guesser named the topic in {number_of_questions} question(s)");
            }
            GameEvent::BudgetExhausted { max_questions } => {
                info!("Game over: more than {max_questions} questions asked");
            }
            GameEvent::Interrupted { transcript_len } => {
                info!("Game interrupted after {transcript_len} transcript entries");
            }
            GameEvent::Finished {
                success,
                number_of_questions,
            } => {
                debug!("Game finished: success={success}, questions={number_of_questions:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn fn_event_handler_receives_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        let handler = FnEventHandler::new(move |event| {
            if let GameEvent::TurnStarted { agent, turn } = event {
                s.lock().unwrap().push(format!("{agent}:{turn}"));
            }
        });
        handler.on_event(&GameEvent::TurnStarted {
            agent: "Host",
            turn: 1,
        });
        handler.on_event(&GameEvent::Guessed {
            number_of_questions: 3,
        });
        assert_eq!(*seen.lock().unwrap(), vec!["Host:1".to_string()]);
    }

    #[test]
    fn composite_handler_delegates_to_all() {
        let count = Arc::new(Mutex::new(0u32));
        let c1 = count.clone();
        let c2 = count.clone();
        let handler = CompositeEventHandler::new()
            .with(FnEventHandler::new(move |_| *c1.lock().unwrap() += 1))
            .with(FnEventHandler::new(move |_| *c2.lock().unwrap() += 10))
            .with_if(false, FnEventHandler::new(|_| panic!("skipped handler ran")));
        handler.on_event(&GameEvent::BudgetExhausted { max_questions: 20 });
        assert_eq!(*count.lock().unwrap(), 11);
    }

    #[test]
    fn logging_handler_accepts_every_event() {
        let events = [
            GameEvent::GameStarted {
                id: "g",
                topic: "pear",
                host: "H",
                guesser: "G",
            },
            GameEvent::Utterance {
                agent: "H",
                content: &"x".repeat(300),
                closing: true,
            },
            GameEvent::Interrupted { transcript_len: 4 },
            GameEvent::Finished {
                success: false,
                number_of_questions: None,
            },
        ];
        for event in &events {
            LoggingHandler.on_event(event);
        }
    }
}
