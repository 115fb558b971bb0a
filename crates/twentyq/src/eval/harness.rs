//! Batch evaluation: many games per variant, aggregated and persisted.
//!
//! ```ignore
//! let evaluator = Evaluator::new(Arc::new(client), EvalConfig::default().with_trials(20));
//! for (variant, outcome) in evaluator.run_sweep(Sweep::Topic).await {
//!     match outcome {
//!         Ok(path) => println!("{} = {} -> {}", variant.parameter, variant.value, path.display()),
//!         Err(e) => eprintln!("{} = {} failed: {e}", variant.parameter, variant.value),
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::record::EvaluationRecord;
use super::runner::{default_concurrency, run_trials};
use super::sweep::{Sweep, Variant};
use crate::api::CompletionGateway;
use crate::config::GameConfig;
use crate::game::{EngineError, GameEngine, GameResult};

/// Errors that fail a whole variant.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid evaluation config: {0}")]
    InvalidConfig(String),

    #[error("trial {index} failed: {source}")]
    Trial {
        index: usize,
        #[source]
        source: EngineError,
    },

    #[error("all {trials} trials failed; first error: {first}")]
    AllTrialsFailed { trials: usize, first: Box<EvalError> },

    #[error("failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("evaluation cancelled")]
    Cancelled,

    #[error("trial task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// What to do when some trials of a variant fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Any failed trial fails the variant; nothing is aggregated or written.
    #[default]
    AbortBatch,
    /// Drop failed trials, aggregate the rest, and count the drops.
    ExcludeFailed,
}

/// Settings for an [`Evaluator`].
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Games per variant. Default: `10`.
    pub trials: usize,
    /// Confidence level of the interval, in `(0, 1)`. Default: `0.95`.
    pub confidence: f64,
    /// Games in flight at once. Default: available parallelism.
    pub concurrency: usize,
    /// Where records are written. Default: `evals`.
    pub output_dir: PathBuf,
    pub failure_policy: FailurePolicy,
    /// Engine settings shared by every trial.
    pub game: GameConfig,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            trials: 10,
            confidence: 0.95,
            concurrency: default_concurrency(),
            output_dir: PathBuf::from("evals"),
            failure_policy: FailurePolicy::default(),
            game: GameConfig::default(),
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        if self.trials == 0 {
            return Err(EvalError::InvalidConfig("trials must be at least 1".into()));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(EvalError::InvalidConfig(format!(
                "confidence must be between 0 and 1, got {}",
                self.confidence
            )));
        }
        if self.concurrency == 0 {
            return Err(EvalError::InvalidConfig(
                "concurrency must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Runs variants through the game engine and records the statistics.
pub struct Evaluator {
    gateway: Arc<dyn CompletionGateway>,
    config: EvalConfig,
    cancel: CancellationToken,
}

impl Evaluator {
    pub fn new(gateway: Arc<dyn CompletionGateway>, config: EvalConfig) -> Self {
        Self {
            gateway,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Every trial observes `token`. A variant interrupted by it fails with
    /// [`EvalError::Cancelled`] and is not written, and
    /// [`run_sweep`](Self::run_sweep) starts no further variants.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Play `config.trials` games of `variant` and aggregate them.
    /// Nothing is written.
    pub async fn run_variant(&self, variant: &Variant) -> Result<EvaluationRecord, EvalError> {
        self.config.validate()?;
        info!(
            "Evaluating {} = {}: {} trial(s), concurrency {}",
            variant.parameter, variant.value, self.config.trials, self.config.concurrency
        );

        let outcomes = run_trials(
            self.config.trials,
            self.config.concurrency,
            |index| self.trial(index, variant),
            EvalError::Join,
        )
        .await;

        // Interrupted games are not real losses.
        if self.cancel.is_cancelled() {
            warn!("Evaluation of {} = {} cancelled", variant.parameter, variant.value);
            return Err(EvalError::Cancelled);
        }

        let mut results: Vec<GameResult> = Vec::with_capacity(outcomes.len());
        let mut failures: Vec<EvalError> = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => failures.push(e),
            }
        }

        match self.config.failure_policy {
            FailurePolicy::AbortBatch => {
                if let Some(first) = failures.into_iter().next() {
                    return Err(first);
                }
            }
            FailurePolicy::ExcludeFailed => {
                for e in &failures {
                    warn!("Excluding failed trial: {e}");
                }
                if results.is_empty()
                    && let Some(first) = failures.into_iter().next()
                {
                    return Err(EvalError::AllTrialsFailed {
                        trials: self.config.trials,
                        first: Box::new(first),
                    });
                }
            }
        }

        let failed_trials = self.config.trials - results.len();
        let record = EvaluationRecord::new(
            variant.parameter.clone(),
            variant.value.clone(),
            self.config.confidence,
            failed_trials,
            variant.params.clone(),
            results,
        );
        info!(
            "Success rate: {} for {} = {}, CI: {} - {}",
            record.success_rate, variant.parameter, variant.value, record.ci_lower, record.ci_upper
        );
        Ok(record)
    }

    /// [`run_variant`](Self::run_variant), then write the record to
    /// `config.output_dir`. Returns the path written.
    pub async fn evaluate(&self, variant: &Variant) -> Result<PathBuf, EvalError> {
        let record = self.run_variant(variant).await?;
        let path = record.write_to(&self.config.output_dir)?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Evaluate every variant of `sweep` in order. A failed variant does not
    /// stop the sweep; cancellation does.
    pub async fn run_sweep(&self, sweep: Sweep) -> Vec<(Variant, Result<PathBuf, EvalError>)> {
        let mut outcomes = Vec::new();
        for variant in sweep.variants() {
            if self.cancel.is_cancelled() {
                info!("Sweep cancelled; skipping remaining variants");
                break;
            }
            let outcome = self.evaluate(&variant).await;
            outcomes.push((variant, outcome));
        }
        outcomes
    }

    /// One game, owning everything it needs so it can run on any worker.
    fn trial(
        &self,
        index: usize,
        variant: &Variant,
    ) -> impl Future<Output = Result<GameResult, EvalError>> + Send + use<> {
        let gateway = self.gateway.clone();
        let params = variant.params.clone();
        let game = self.config.game.clone();
        let cancel = self.cancel.clone();
        async move {
            let engine = GameEngine::new(gateway.as_ref(), params, game)
                .map_err(|source| EvalError::Trial { index, source })?;
            engine
                .with_cancellation(cancel)
                .run()
                .await
                .map_err(|source| EvalError::Trial { index, source })
        }
    }
}
