//! Contract with the generative-model service and an OpenAI-compatible
//! chat-completions client that implements it.
//!
//! Every call is a single system + user message pair answered in JSON mode.
//! Callers own prompt construction and schema validation; this crate only
//! moves text in and out.

mod client;
mod error;
mod fences;

use async_trait::async_trait;

pub use client::{OpenAiClient, OpenAiConfig};
pub use error::ModelError;
pub use fences::strip_code_fences;

/// One JSON-mode completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl CompletionRequest {
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
        }
    }
}

/// A service that answers a [`CompletionRequest`] with raw JSON text.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Returns the message content with any markdown fences removed. The text
    /// is not guaranteed to be valid JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] on transport failure, a non-success status, or
    /// an empty completion.
    async fn complete_json(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}
