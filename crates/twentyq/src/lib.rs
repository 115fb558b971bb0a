//! Two-agent "20 questions" games on top of an LLM chat completions API,
//! plus an evaluation harness that measures how often the guesser wins.
//!
//! A game pits a **Host** (who knows a secret topic) against a **Guesser**
//! (who asks yes/no questions). Both are plain system prompts addressed to
//! the same [`CompletionGateway`](api::CompletionGateway); the
//! [`GameEngine`](game::GameEngine) alternates turns over a shared
//! [`Transcript`](game::Transcript) until the guesser names the topic, the
//! question budget runs out, or the run is cancelled.
//!
//! The [`eval`] module runs many games concurrently per parameter variant
//! (temperature, prompt wording, topic) and reports a success rate with a
//! binomial confidence interval.
//!
//! # Getting started
//!
//! ```ignore
//! use twentyq::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = std::env::var("OPENROUTER_KEY")?;
//!     let gateway = OpenRouterClient::new(api_key)?;
//!
//!     let params = GameParameters::new("pear")
//!         .with_host_instructions(default_host_instructions())
//!         .with_guessing_instructions(default_guessing_instructions());
//!
//!     let result = GameEngine::new(&gateway, params, GameConfig::default())?
//!         .with_event_handler(&LoggingHandler)
//!         .run()
//!         .await?;
//!
//!     println!("won={} in {:?} questions", result.success, result.number_of_questions);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | [`CompletionGateway`](api::CompletionGateway) trait, [`GatewayError`](api::GatewayError), scripted test gateway |
//! | [`agent`] | Immutable [`Agent`](agent::Agent) role descriptors and role prompts |
//! | [`game`] | Parameters, transcript, topic matcher, events, and the [`GameEngine`](game::GameEngine) |
//! | [`eval`] | Concurrent trial runner, statistics, sweeps, and persisted evaluation records |
//! | [`config`] | [`GameConfig`](config::GameConfig) engine settings |

pub mod agent;
pub mod api;
pub mod config;
pub mod eval;
pub mod game;
pub mod prelude;

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::api::GatewayError;

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default model for both agents.
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-2024-05-13";

/// Default sampling temperature for both agents.
pub const DEFAULT_TEMPERATURE: f32 = 0.8;

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body. Only the fields a game turn needs;
/// unused optional fields are omitted from serialization.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    // Always sent; 0.0 is a valid setting.
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// JSON output format type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ResponseFormatType {
    #[serde(rename = "json_object")]
    JsonObject,
}

/// JSON output mode.
#[derive(Serialize, Debug)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub fmt_type: ResponseFormatType,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            fmt_type: ResponseFormatType::JsonObject,
        }
    }
}

// ── Message types ──────────────────────────────────────────────────

/// Role of a message as seen by the completions API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A message in an API conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Clean return type from [`OpenRouterClient::chat()`].
#[derive(Debug)]
pub struct ChatCompletion {
    pub content: Option<String>,
    pub finish_reason: Option<String>,
}

/// Token usage statistics; only logged.
#[derive(Deserialize, Debug)]
struct UsageInfo {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the OpenRouter chat completions API.
///
/// Implements [`CompletionGateway`](api::CompletionGateway), so it can be
/// handed straight to a [`GameEngine`](game::GameEngine) or an
/// [`Evaluator`](eval::Evaluator). The inner `reqwest::Client` pools
/// connections and is safe to share across concurrent trials.
pub struct OpenRouterClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) referer: String,
    pub(crate) title: String,
}

impl OpenRouterClient {
    /// Create a new client with the given API key and default headers.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_headers(api_key, "https://github.com/twentyq/twentyq", "twentyq")
    }

    /// Create a new client with custom Referer and X-Title headers.
    pub fn with_headers(
        api_key: impl Into<String>,
        referer: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent("twentyq/0.1")
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| GatewayError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            referer: referer.into(),
            title: title.into(),
        })
    }

    /// Send a chat completion request.
    pub async fn chat(&self, body: &ChatRequest) -> Result<ChatCompletion, GatewayError> {
        debug!(
            "LLM request: model={}, messages={}, temp={}, json={}",
            body.model,
            body.messages.len(),
            body.temperature,
            body.response_format.is_some(),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Request(format!("failed to read response: {e}")))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| GatewayError::Parse(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(GatewayError::Api(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        match parsed.choices.and_then(|c| c.into_iter().next()) {
            Some(c) => Ok(ChatCompletion {
                content: c.message.content,
                finish_reason: c.finish_reason,
            }),
            None => {
                debug!("LLM output: empty (no choices)");
                Ok(ChatCompletion {
                    content: None,
                    finish_reason: None,
                })
            }
        }
    }
}
