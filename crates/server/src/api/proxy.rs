use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{info, instrument, warn};

use cardrelay_core::{CardResult, PaymentRequest, RESULT_MODEL, auth_token};
use cardrelay_issuer::{IssuerError, IssuerResponse};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{ErrorResponse, TransactionErrorResponse};

/// `POST /proxy` -- issue a virtual card for a payment request.
///
/// On success the result is returned at once and delivered to the webhook in
/// the background until acknowledged. A declined transaction is forwarded to
/// the webhook once and returned with the issuer's status.
#[utoipa::path(
    post,
    path = "/proxy",
    tag = "Proxy",
    summary = "Issue virtual card",
    description = "Extracts the payment fields, requests a virtual card from the issuer, and returns the result. Successful results are also delivered to the downstream webhook with retries until acknowledged.",
    request_body(content = Object, description = "Payment request record"),
    responses(
        (status = 200, description = "Card issued", body = CardResult),
        (status = 400, description = "Invalid JSON or missing fields", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 502, description = "Issuer unreachable or unusable response", body = ErrorResponse),
        (status = "default", description = "Issuer declined the transaction", body = TransactionErrorResponse)
    )
)]
pub async fn proxy(State(state): State<AppState>, body: Bytes) -> Result<Response, ServerError> {
    let data: Value =
        serde_json::from_slice(&body).map_err(|e| ServerError::InvalidJson(e.to_string()))?;

    if state.authorize(auth_token(&data)).is_err() {
        warn!("unauthorized proxy request");
        return Err(ServerError::Unauthorized);
    }

    let payment = PaymentRequest::from_json(&data)?;
    process(&state, &payment).await
}

#[instrument(skip_all, fields(payment_id = %payment.payment_id))]
async fn process(state: &AppState, payment: &PaymentRequest) -> Result<Response, ServerError> {
    let response = state.issuer.issue(payment).await.inspect_err(|e| {
        warn!(error = %e, "issuer request failed");
    })?;

    if !response.is_success() {
        return Ok(declined(state, payment, &response));
    }

    let card = response.virtual_card().ok_or_else(|| {
        IssuerError::InvalidResponse("missing or malformed virtual_card".into())
    })?;
    let result = CardResult::new(payment, response.status, &card)
        .map_err(|e| IssuerError::InvalidResponse(e.to_string()))?;

    let payload = serde_json::to_value(&result)
        .map_err(|e| ServerError::Config(format!("failed to encode result: {e}")))?;
    state.launcher.launch(payment.delivery_key(), payload);
    info!(status = response.status, "virtual card issued");

    Ok((StatusCode::OK, Json(result)).into_response())
}

fn declined(state: &AppState, payment: &PaymentRequest, response: &IssuerResponse) -> Response {
    warn!(
        status = response.status,
        message = response.message(),
        "issuer declined transaction"
    );

    let error = TransactionErrorResponse {
        model: RESULT_MODEL.to_owned(),
        request_id: payment.request_id.clone(),
        status: response.status,
        error: response.error_detail(),
    };
    match serde_json::to_value(&error) {
        Ok(payload) => {
            state.launcher.forward_once(payload);
        }
        Err(e) => warn!(error = %e, "failed to encode error payload"),
    }

    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(error)).into_response()
}
