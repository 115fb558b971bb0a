//! The completion gateway: one LLM call per game turn.
//!
//! The engine never talks HTTP directly. It builds a [`CompletionRequest`]
//! (instructions, role-remapped transcript, temperature, JSON flag) and hands
//! it to a [`CompletionGateway`]. Failures surface as [`GatewayError`] and are
//! not retried here; rate limiting and pooling belong to the implementation.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::debug;

use crate::{ChatRequest, Message, OpenRouterClient, ResponseFormat};

/// Future returned by [`CompletionGateway::complete`].
pub type GatewayFuture<'a> = BoxFuture<'a, Result<String, GatewayError>>;

/// Errors raised by a completion gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("completion API HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The API answered 200 but reported an error in the body.
    #[error("completion API error: {0}")]
    Api(String),

    /// The response body was not the expected JSON shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The API returned no text content.
    #[error("empty completion from model {model}")]
    EmptyResponse { model: String },

    /// A scripted gateway ran out of responses or was told to fail.
    #[error("scripted gateway: {0}")]
    Script(String),
}

/// A single completion call as issued by the engine.
///
/// `transcript` is already rendered from the perspective of the agent being
/// invoked: its own lines are `assistant`, the other party's are `user`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub transcript: Vec<Message>,
    pub temperature: f32,
    pub force_json: bool,
}

impl CompletionRequest<'_> {
    /// Full message list for the API: system prompt followed by the transcript.
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        messages.push(Message::system(self.instructions));
        messages.extend(self.transcript.iter().cloned());
        messages
    }
}

/// Maps a completion request to a single textual utterance.
///
/// Implementations must be shareable across concurrently running trials.
///
/// # Example
///
/// ```ignore
/// struct Echo;
///
/// impl CompletionGateway for Echo {
///     fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
///         Box::pin(async move {
///             Ok(request.transcript.last().map(|m| m.content.clone()).unwrap_or_default())
///         })
///     }
/// }
/// ```
pub trait CompletionGateway: Send + Sync {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a>;
}

impl<G: CompletionGateway + ?Sized> CompletionGateway for std::sync::Arc<G> {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
        (**self).complete(request)
    }
}

impl<G: CompletionGateway + ?Sized> CompletionGateway for &G {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
        (**self).complete(request)
    }
}

impl CompletionGateway for OpenRouterClient {
    fn complete<'a>(&'a self, request: CompletionRequest<'a>) -> GatewayFuture<'a> {
        Box::pin(async move {
            let body = ChatRequest {
                model: request.model.to_string(),
                messages: request.to_messages(),
                temperature: request.temperature,
                response_format: request.force_json.then(ResponseFormat::json_object),
                ..Default::default()
            };

            let completion = self.chat(&body).await?;
            match completion.content {
                Some(text) if !text.is_empty() => Ok(text),
                _ => {
                    debug!(
                        "Empty completion (finish_reason={:?})",
                        completion.finish_reason
                    );
                    Err(GatewayError::EmptyResponse {
                        model: request.model.to_string(),
                    })
                }
            }
        })
    }
}
