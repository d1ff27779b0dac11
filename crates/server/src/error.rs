use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use cardrelay_core::CoreError;
use cardrelay_issuer::IssuerError;

/// Errors that can occur when running the cardrelay server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The request body is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The auth token is missing or does not match.
    #[error("unauthorized")]
    Unauthorized,

    /// Required payment fields are missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    /// An acknowledgment carried no delivery key.
    #[error("missing delivery key")]
    MissingDeliveryKey,

    /// The issuer could not be reached or answered with something unusable.
    #[error("issuer request failed: {0}")]
    Issuer(#[from] IssuerError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::InvalidJson(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid JSON", "message": msg }),
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": "Unauthorized" }),
            ),
            Self::InvalidInput(e) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid input", "message": e.to_string() }),
            ),
            Self::MissingDeliveryKey => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Missing payment_id" }),
            ),
            Self::Issuer(e) => (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({
                    "status": StatusCode::BAD_GATEWAY.as_u16(),
                    "error": "Wex API request failed",
                    "message": e.to_string(),
                }),
            ),
            Self::Config(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
            Self::Io(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": e.to_string() }),
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}
