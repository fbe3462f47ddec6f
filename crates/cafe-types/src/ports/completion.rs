use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("completion service not configured")]
    NotConfigured,

    #[error("completion transport error: {0}")]
    Transport(String),

    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("completion parse error: {0}")]
    Parse(String),
}

/// AI completion service used by the recommendation and chat adapters.
#[async_trait]
pub trait CompletionService: Send + Sync + 'static {
    /// Sends `prompt` constrained to `schema`. Returns `{}` when the model
    /// text is empty or not valid JSON.
    async fn generate_json(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<serde_json::Value, CompletionError>;

    /// Sends a single message under a persona instruction and returns the
    /// reply text, which may be empty.
    async fn chat(&self, persona: &str, message: &str) -> Result<String, CompletionError>;
}
