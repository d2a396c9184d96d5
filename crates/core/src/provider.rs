//! Completion provider trait: the abstraction over chat-completion backends.
//!
//! A provider knows how to send an assembled conversation to an LLM and get
//! the reply text back. Implementations: OpenAI-compatible endpoints (Groq,
//! Together.ai, custom).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// A single chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "llama3-8b-8192")
    pub model: String,

    /// The fully assembled conversation
    pub messages: Vec<Message>,

    /// Sampling temperature, forwarded only when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate, forwarded only when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Text of the first returned choice; never empty
    pub content: String,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// The core completion trait.
///
/// The ask pipeline calls `complete()` without knowing which vendor sits
/// behind it.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "groq", "together").
    fn name(&self) -> &str;

    /// Send a request and get the first choice's text.
    ///
    /// Returns [`ProviderError::EmptyReply`] when the provider answers without
    /// any usable content.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;
}
