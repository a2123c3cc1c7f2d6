pub mod client;
pub mod config;
pub mod errors;
pub mod relay;

use async_trait::async_trait;
use errors::CompletionError;

/// A service that answers one prompt with one textual reply.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Model parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: config::DEFAULT_MODEL.to_string(),
            temperature: config::DEFAULT_TEMPERATURE,
            max_tokens: config::DEFAULT_MAX_TOKENS,
        }
    }
}
