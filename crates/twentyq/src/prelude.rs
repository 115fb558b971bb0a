//! Convenience re-exports for common `twentyq` types.
//!
//! Meant to be glob-imported by programs that play or evaluate games:
//!
//! ```ignore
//! use twentyq::prelude::*;
//! ```
//!
//! Statistics helpers, the trial runner, and record file naming are left
//! out; import those from [`crate::eval`] directly when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, Message, OpenRouterClient};

// ── Gateway ─────────────────────────────────────────────────────────
pub use crate::api::{
    CompletionGateway, CompletionRequest, GatewayError, GatewayFuture, ScriptedGateway,
};

// ── Agents & config ─────────────────────────────────────────────────
pub use crate::agent::{Agent, default_guessing_instructions, default_host_instructions};
pub use crate::config::{DEFAULT_MAX_QUESTIONS, GameConfig};

// ── Game ────────────────────────────────────────────────────────────
pub use crate::game::{
    CompositeEventHandler, EngineError, EventHandler, FnEventHandler, GameEngine, GameEvent,
    GameParameters, GameResult, LoggingHandler, NoopHandler, Transcript, Utterance,
};

// ── Evaluation ──────────────────────────────────────────────────────
pub use crate::eval::{EvalConfig, EvalError, EvaluationRecord, Evaluator, FailurePolicy, Sweep};
