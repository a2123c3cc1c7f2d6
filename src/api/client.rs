// src/api/client.rs

use super::{config, errors::CompletionError, CompletionService, ModelSettings};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// API client for the OpenAI chat completions endpoint.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    settings: ModelSettings,
}

impl OpenAiClient {
    /// Creates a client for `base_url`, e.g. `https://api.openai.com/v1`.
    pub fn with_base_url(api_key: String, settings: ModelSettings, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        }
    }

    /// Sends a request to the chat completions endpoint.
    async fn send_request(&self, messages: Vec<Value>) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.settings.model,
                "messages": messages,
                "temperature": self.settings.temperature,
                "max_tokens": self.settings.max_tokens,
                "top_p": 1,
                "frequency_penalty": 0,
                "presence_penalty": 0,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(CompletionError::ApiError(format!("{}: {}", status, error_text)));
        }

        let raw_response = response.text().await?;
        let json_response: Value = serde_json::from_str(&raw_response)?;

        if let Some(error) = json_response.get("error") {
            return Err(CompletionError::ApiError(error.to_string()));
        }

        let content = json_response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(CompletionError::EmptyResponse)?
            .to_string();

        log::debug!("Completion response: {}", content);
        Ok(content)
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        log::debug!("Calling chat completions with model {}", self.settings.model);

        let messages = vec![
            json!({"role": "system", "content": config::CODE_ASSISTANT_SYSTEM_PROMPT}),
            json!({"role": "user", "content": prompt}),
        ];

        self.send_request(messages).await
    }
}
