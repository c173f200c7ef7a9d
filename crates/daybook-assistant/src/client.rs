use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text")]
    Empty,
}

/// One call, prompt in, reply out. Held as `Arc<dyn AssistantClient>` so tests
/// can swap in a canned backend.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AssistantError>;
}
