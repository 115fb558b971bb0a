//! The game loop.
//!
//! [`GameEngine`] alternates host and guesser turns through a
//! [`CompletionGateway`], growing one [`Transcript`], until the guesser names
//! the topic, runs out of questions, or the run is cancelled.
//!
//! # Example
//!
//! ```ignore
//! let gateway = OpenRouterClient::new(api_key)?;
//! let result = GameEngine::new(&gateway, GameParameters::new("pear"), GameConfig::default())?
//!     .with_event_handler(&LoggingHandler)
//!     .run()
//!     .await?;
//! println!("success={} questions={:?}", result.success, result.number_of_questions);
//! ```

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::events::{EventHandler, GameEvent, NoopHandler};
use super::matcher::TopicMatcher;
use super::params::GameParameters;
use super::result::GameResult;
use super::transcript::Transcript;
use crate::agent::Agent;
use crate::api::{CompletionGateway, CompletionRequest, GatewayError};
use crate::config::GameConfig;

/// Errors that end a game without a [`GameResult`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// The parameters cannot be played; raised before any gateway call.
    #[error("invalid game parameters: {0}")]
    InvalidParameters(String),

    /// A completion call failed. Not retried.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The guesser named the topic.
    Guessed,
    /// The guesser took more turns than allowed.
    BudgetExhausted,
    /// Cancelled from outside.
    Interrupted,
}

impl Outcome {
    pub fn is_success(self) -> bool {
        matches!(self, Outcome::Guessed)
    }
}

/// Position in the turn protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingHostTurn,
    AwaitingGuesserTurn,
    Terminated(Outcome),
}

/// Drives one game from the first host line to a [`GameResult`].
///
/// The engine borrows the gateway and the event handler, so both must
/// outlive `.run()`. Consumed by `run`; build a new engine per game.
pub struct GameEngine<'a> {
    gateway: &'a dyn CompletionGateway,
    params: GameParameters,
    config: GameConfig,
    host: Agent,
    guesser: Agent,
    matcher: TopicMatcher,
    event_handler: &'a dyn EventHandler,
    cancel: CancellationToken,
}

impl<'a> GameEngine<'a> {
    /// Validate `params` and resolve both agents.
    pub fn new(
        gateway: &'a dyn CompletionGateway,
        params: GameParameters,
        config: GameConfig,
    ) -> Result<Self, EngineError> {
        params.validate()?;
        if config.host_name == config.guesser_name {
            return Err(EngineError::InvalidParameters(format!(
                "host and guesser share the name '{}'",
                config.host_name
            )));
        }
        let matcher = TopicMatcher::new(&params.topic)
            .map_err(|e| EngineError::InvalidParameters(e.to_string()))?;
        let host = Agent::host(&params, &config);
        let guesser = Agent::guesser(&params, &config);

        Ok(Self {
            gateway,
            params,
            config,
            host,
            guesser,
            matcher,
            event_handler: &NoopHandler,
            cancel: CancellationToken::new(),
        })
    }

    /// Attach an event handler.
    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    /// Attach a cancellation token. Cancelling it ends the game as a loss,
    /// even while a gateway call is in flight.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn host(&self) -> &Agent {
        &self.host
    }

    pub fn guesser(&self) -> &Agent {
        &self.guesser
    }

    /// Play the game to completion.
    pub async fn run(self) -> Result<GameResult, EngineError> {
        let id = Uuid::new_v4().to_string();
        let mut transcript = Transcript::new();
        let mut questions: u32 = 0;

        info!(
            "Game {id} started: topic={:?}, host={}, guesser={}",
            self.params.topic,
            self.host.model(),
            self.guesser.model()
        );
        self.event_handler.on_event(&GameEvent::GameStarted {
            id: &id,
            topic: &self.params.topic,
            host: self.host.name(),
            guesser: self.guesser.name(),
        });

        let mut state = GameState::AwaitingHostTurn;
        let mut outcome = loop {
            state = match state {
                GameState::AwaitingHostTurn => {
                    let spoke = self
                        .take_turn(
                            &self.host,
                            self.params.host_agent_temperature,
                            &mut transcript,
                            false,
                        )
                        .await?;
                    if spoke {
                        GameState::AwaitingGuesserTurn
                    } else {
                        GameState::Terminated(Outcome::Interrupted)
                    }
                }
                GameState::AwaitingGuesserTurn => {
                    let spoke = self
                        .take_turn(
                            &self.guesser,
                            self.params.guessing_agent_temperature,
                            &mut transcript,
                            false,
                        )
                        .await?;
                    if spoke {
                        questions = self.questions_asked(&transcript);
                        self.after_guess(&transcript, questions)
                    } else {
                        GameState::Terminated(Outcome::Interrupted)
                    }
                }
                GameState::Terminated(outcome) => break outcome,
            };
        };

        // An interrupt during the closing remark voids the finished game.
        if outcome != Outcome::Interrupted
            && self.config.closing_remark
            && !self
                .take_turn(
                    &self.host,
                    self.params.host_agent_temperature,
                    &mut transcript,
                    true,
                )
                .await?
        {
            outcome = Outcome::Interrupted;
        }

        if outcome == Outcome::Interrupted {
            self.event_handler.on_event(&GameEvent::Interrupted {
                transcript_len: transcript.len(),
            });
            info!("Game {id} interrupted");
        }

        let number_of_questions = match outcome {
            Outcome::Interrupted => Some(questions).filter(|&n| n > 0),
            _ => Some(questions),
        };
        let success = outcome.is_success();

        info!("Game {id} finished: success={success}, questions={number_of_questions:?}");
        self.event_handler.on_event(&GameEvent::Finished {
            success,
            number_of_questions,
        });

        Ok(GameResult {
            id,
            success,
            number_of_questions,
            transcript,
        })
    }

    /// Transition after the guesser has spoken. The win check runs first,
    /// so naming the topic on the last allowed turn still wins.
    fn after_guess(&self, transcript: &Transcript, questions: u32) -> GameState {
        let latest = transcript.last().map(|u| u.content.as_str()).unwrap_or_default();
        if self.matcher.is_match(latest) {
            self.event_handler.on_event(&GameEvent::Guessed {
                number_of_questions: questions,
            });
            GameState::Terminated(Outcome::Guessed)
        } else if questions > self.config.max_questions {
            self.event_handler.on_event(&GameEvent::BudgetExhausted {
                max_questions: self.config.max_questions,
            });
            GameState::Terminated(Outcome::BudgetExhausted)
        } else {
            GameState::AwaitingHostTurn
        }
    }

    fn questions_asked(&self, transcript: &Transcript) -> u32 {
        u32::try_from(transcript.count_by(self.guesser.name())).unwrap_or(u32::MAX)
    }

    /// Invoke `agent` once and append its reply. Returns `false` if the run
    /// was cancelled before the reply arrived; nothing is appended then.
    async fn take_turn(
        &self,
        agent: &Agent,
        temperature: f32,
        transcript: &mut Transcript,
        closing: bool,
    ) -> Result<bool, EngineError> {
        if self.cancel.is_cancelled() {
            return Ok(false);
        }
        let turn = transcript.count_by(agent.name()) + 1;
        self.event_handler.on_event(&GameEvent::TurnStarted {
            agent: agent.name(),
            turn: u32::try_from(turn).unwrap_or(u32::MAX),
        });

        let request = CompletionRequest {
            model: agent.model(),
            instructions: agent.instructions(),
            transcript: transcript.render_for(agent.name()),
            temperature,
            force_json: false,
        };
        debug!(
            "{} turn {turn}: {} message(s) in context",
            agent.name(),
            request.transcript.len()
        );

        let reply = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(false),
            reply = self.gateway.complete(request) => reply?,
        };
        debug!("{} replied with {} chars", agent.name(), reply.chars().count());

        let utterance = transcript.push(agent.name(), reply);
        self.event_handler.on_event(&GameEvent::Utterance {
            agent: &utterance.role,
            content: &utterance.content,
            closing,
        });
        Ok(true)
    }
}
