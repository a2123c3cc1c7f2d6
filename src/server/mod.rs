mod error;

use crate::api::relay::{RelayRequest, RelayResponse};
use crate::api::CompletionService;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use error::RelayError;
use std::net::SocketAddr;
use std::sync::Arc;

/// Build the relay router
pub fn router(service: Arc<dyn CompletionService>) -> Router {
    Router::new()
        .route("/api/sendMessage", post(send_message))
        .with_state(service)
}

/// Serves the relay until the process is stopped.
pub async fn serve(
    address: SocketAddr,
    service: Arc<dyn CompletionService>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    log::info!("Relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await
}

/// POST /api/sendMessage - forward one message to the completion service
async fn send_message(
    State(service): State<Arc<dyn CompletionService>>,
    payload: Result<Json<RelayRequest>, JsonRejection>,
) -> Result<Json<RelayResponse>, RelayError> {
    let Json(request) = payload.map_err(|e| RelayError::BadRequest(e.body_text()))?;

    match service.complete(&request.message).await {
        Ok(response) => Ok(Json(RelayResponse { response })),
        Err(e) => {
            log::error!("Relay upstream call failed: {}", e);
            Err(RelayError::Upstream)
        }
    }
}
