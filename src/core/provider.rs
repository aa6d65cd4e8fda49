use async_trait::async_trait;

use crate::{
    error::Result,
    services::openai_client::{ChatCompletionRequest, OpenAIClient},
    types::response::{normalize_completion, NormalizedCompletion},
};

/// A chat-completion backend.
///
/// Implementations decode the provider payload before returning, so callers only
/// ever see normalized text or an error. Providers do not bound call duration;
/// [`CompletionRequester`](super::CompletionRequester) owns the per-attempt
/// timeout.
#[async_trait]
pub trait CompletionProvider: Send + Sync + std::fmt::Debug {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<NormalizedCompletion>;
}

/// OpenAI-compatible `/chat/completions` backend
#[derive(Clone, Debug)]
pub struct OpenAIProvider {
    client: OpenAIClient,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key.into()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.set_base_url(base_url);
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    async fn complete(&self, request: ChatCompletionRequest) -> Result<NormalizedCompletion> {
        let body = request.into_value();
        let response = self.client.chat_completion(&body).await?;
        normalize_completion(response)
    }
}
