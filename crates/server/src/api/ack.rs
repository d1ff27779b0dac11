use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::Value;
use tracing::{debug, info};

use cardrelay_core::{DeliveryKey, auth_token};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{AckRequest, AckResponse, ErrorResponse};

/// Header accepted as an alternative to the body token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Body fields that may carry the delivery key, in order of preference.
const KEY_FIELDS: [&str; 2] = ["payment_id", "x_name"];

/// `POST /ack` -- acknowledge a delivered result payload.
///
/// Signals the delivery worker for the key so it stops retrying. Acknowledging
/// a key with no running worker, or acknowledging twice, still succeeds.
#[utoipa::path(
    post,
    path = "/ack",
    tag = "Delivery",
    summary = "Acknowledge delivery",
    description = "Confirms that the downstream receiver has processed the payload for a payment. The key is read from `payment_id`, falling back to `x_name`. The auth token may be sent in the body or the `X-Auth-Token` header; the body wins when both are present.",
    request_body(content = AckRequest, description = "Acknowledgment"),
    params(
        ("X-Auth-Token" = Option<String>, Header, description = "Shared auth token")
    ),
    responses(
        (status = 200, description = "Acknowledged", body = AckResponse),
        (status = 400, description = "Invalid JSON or missing key", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn acknowledge(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
    let data: Value =
        serde_json::from_slice(&body).map_err(|e| ServerError::InvalidJson(e.to_string()))?;

    let supplied = auth_token(&data).or_else(|| {
        headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
    });
    state.authorize(supplied)?;

    let key = delivery_key(&data).ok_or(ServerError::MissingDeliveryKey)?;

    state.launcher.metrics().increment_acks_received();
    if state.registry.acknowledge(&key) {
        info!(delivery_key = %key, "delivery acknowledged");
    } else {
        debug!(delivery_key = %key, "duplicate acknowledgment");
    }

    Ok((
        StatusCode::OK,
        Json(AckResponse {
            status: "acknowledged".into(),
            payment_id: key.to_string(),
        }),
    ))
}

fn delivery_key(data: &Value) -> Option<DeliveryKey> {
    KEY_FIELDS.iter().find_map(|field| {
        let key = match data.get(field)? {
            Value::String(s) => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        (!key.is_empty()).then(|| DeliveryKey::new(key))
    })
}
