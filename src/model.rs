use async_trait::async_trait;
use thiserror::Error;

/// Remote language-model call errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned no content")]
    EmptyResponse,
}

/// One chat-style completion.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system_message: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the raw text of the model's reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}
