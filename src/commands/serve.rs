use crate::api::{client::OpenAiClient, CompletionService};
use crate::errors::AppError;
use crate::server;
use crate::utils::config::Config;
use std::net::SocketAddr;
use std::sync::Arc;

/// Runs the relay with the server-side API key.
pub async fn handle_serve(config: &Config) -> Result<(), AppError> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .ok()
        .or_else(|| config.server_api_key.clone())
        .filter(|key| !key.trim().is_empty())
        .ok_or(AppError::MissingApiKey)?;

    let address: SocketAddr = config
        .listen_address
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Bad listen address: {}", config.listen_address)))?;

    let service: Arc<dyn CompletionService> = Arc::new(OpenAiClient::with_base_url(
        api_key,
        config.model_settings(),
        config.base_url.clone(),
    ));

    println!("Relay listening on http://{}/api/sendMessage", address);
    server::serve(address, service).await?;
    Ok(())
}
