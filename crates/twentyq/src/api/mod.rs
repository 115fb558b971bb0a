//! Completion layer: everything between the game engine and the model.
//!
//! - [`gateway`]: the [`CompletionGateway`] trait, [`CompletionRequest`], and
//!   [`GatewayError`]. [`OpenRouterClient`](crate::OpenRouterClient) is the
//!   production implementation.
//! - [`scripted`]: [`ScriptedGateway`], a deterministic per-role stub for
//!   tests and dry runs.

pub mod gateway;
pub mod scripted;

pub use gateway::{CompletionGateway, CompletionRequest, GatewayError, GatewayFuture};
pub use scripted::ScriptedGateway;
