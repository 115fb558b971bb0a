//! Evaluation harness: run many games per variant and summarize them.
//!
//! - [`runner`]: generic bounded-concurrency trial runner.
//! - [`stats`]: success rate, mean questions, binomial interval.
//! - [`record`]: the per-variant JSON record and its file name.
//! - [`sweep`]: the built-in parameter sweeps.
//! - [`harness`]: [`Evaluator`] tying it together with a [`FailurePolicy`].

pub mod harness;
pub mod record;
pub mod runner;
pub mod stats;
pub mod sweep;

pub use harness::{EvalConfig, EvalError, Evaluator, FailurePolicy};
pub use record::EvaluationRecord;
pub use runner::{default_concurrency, run_trials};
pub use stats::{Summary, binomial_interval, mean_questions, success_rate};
pub use sweep::{Sweep, Variant};
