use crate::api::config::RELAY_ERROR_MESSAGE;
use crate::api::relay::RelayErrorBody;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Relay-layer error type
#[derive(Debug)]
pub enum RelayError {
    /// 400 - Missing or malformed request body
    BadRequest(String),

    /// 500 - The upstream completion call failed
    Upstream,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            RelayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            RelayError::Upstream => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RELAY_ERROR_MESSAGE.to_string(),
            ),
        };

        (status, Json(RelayErrorBody { error })).into_response()
    }
}
