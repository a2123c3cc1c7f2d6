// src/api/relay.rs

use super::{errors::CompletionError, CompletionService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct RelayRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RelayResponse {
    pub response: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RelayErrorBody {
    pub error: String,
}

/// Client for a relay endpoint that keeps the API key server side.
///
/// One `POST` per turn with `{ message }`, answered by `{ response }`.
pub struct RelayClient {
    client: Client,
    url: String,
}

impl RelayClient {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl CompletionService for RelayClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        log::debug!("Calling relay at {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&RelayRequest {
                message: prompt.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let raw_response = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<RelayErrorBody>(&raw_response)
                .map(|body| body.error)
                .unwrap_or(raw_response);
            return Err(CompletionError::ApiError(format!("{}: {}", status, message)));
        }

        let body: RelayResponse = serde_json::from_str(&raw_response)?;
        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_relay_round_trip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/sendMessage")
            .match_body(Matcher::Json(json!({"message": "hello"})))
            .with_status(200)
            .with_body(r#"{"response":"{\"message\":\"hi\",\"files\":[]}"}"#)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/api/sendMessage", server.url()));
        let reply = client.complete("hello").await.unwrap();

        assert_eq!(reply, r#"{"message":"hi","files":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_relay_error_body_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/sendMessage")
            .with_status(500)
            .with_body(r#"{"error":"Error communicating with OpenAI"}"#)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/api/sendMessage", server.url()));
        let err = client.complete("hello").await.unwrap_err();

        assert!(err.to_string().contains("Error communicating with OpenAI"));
    }

    #[tokio::test]
    async fn test_relay_body_without_response_field_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/sendMessage")
            .with_status(200)
            .with_body(r#"{"unexpected":true}"#)
            .create_async()
            .await;

        let client = RelayClient::new(format!("{}/api/sendMessage", server.url()));
        let err = client.complete("hello").await.unwrap_err();

        assert!(matches!(err, CompletionError::JsonError(_)));
    }
}
