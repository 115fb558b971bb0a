//! One game of twenty questions.
//!
//! - [`GameParameters`]: topic, temperatures, and prompt fragments.
//! - [`Transcript`]: the shared append-only log, rendered per agent.
//! - [`TopicMatcher`]: whole-word, case-insensitive win detection.
//! - [`GameEngine`]: the turn loop, producing a [`GameResult`].
//! - [`events`]: observability hooks for a running game.

pub mod engine;
pub mod events;
pub mod matcher;
pub mod params;
pub mod result;
pub mod transcript;

pub use engine::{EngineError, GameEngine, GameState, Outcome};
pub use events::{
    CompositeEventHandler, EventHandler, FnEventHandler, GameEvent, LoggingHandler, NoopHandler,
};
pub use matcher::TopicMatcher;
pub use params::GameParameters;
pub use result::GameResult;
pub use transcript::{Transcript, Utterance};
