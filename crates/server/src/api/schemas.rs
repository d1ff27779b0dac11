use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use cardrelay_delivery::DeliveryMetricsSnapshot;

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status indicator.
    #[schema(example = "ok")]
    pub status: String,
    /// Current delivery metrics snapshot.
    pub delivery: MetricsResponse,
}

/// Delivery counters.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    /// Deliveries started.
    #[schema(example = 42)]
    pub launched: u64,
    /// Deliveries that could not be started.
    #[schema(example = 0)]
    pub launch_failures: u64,
    /// Outbound attempts sent, including retries.
    #[schema(example = 57)]
    pub attempts: u64,
    /// Attempts that failed at the transport level.
    #[schema(example = 3)]
    pub transport_failures: u64,
    /// Deliveries that ended acknowledged.
    #[schema(example = 40)]
    pub acknowledged: u64,
    /// Deliveries that ran out of attempts.
    #[schema(example = 1)]
    pub exhausted: u64,
    /// Deliveries currently running.
    #[schema(example = 1)]
    pub in_flight: u64,
    /// Acknowledgment calls received.
    #[schema(example = 41)]
    pub acks_received: u64,
    /// Acknowledgment signals currently held in the registry.
    #[schema(example = 1)]
    pub pending_signals: u64,
}

impl MetricsResponse {
    pub fn new(snap: &DeliveryMetricsSnapshot, pending_signals: usize) -> Self {
        Self {
            launched: snap.launched,
            launch_failures: snap.launch_failures,
            attempts: snap.attempts,
            transport_failures: snap.transport_failures,
            acknowledged: snap.acknowledged,
            exhausted: snap.exhausted,
            in_flight: snap.in_flight,
            acks_received: snap.acks_received,
            pending_signals: u64::try_from(pending_signals).unwrap_or(u64::MAX),
        }
    }
}

/// Body of an acknowledgment call.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AckRequest {
    /// Delivery key being acknowledged.
    #[schema(example = "PAY-0042")]
    pub payment_id: Option<String>,
    /// Accepted in place of `payment_id`.
    #[schema(example = "PAY-0042")]
    pub x_name: Option<String>,
    /// Shared auth token; may instead be sent in the `X-Auth-Token` header.
    pub x_studio_proxy_auth_token: Option<String>,
}

/// Successful acknowledgment.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    #[schema(example = "acknowledged")]
    pub status: String,
    #[schema(example = "PAY-0042")]
    pub payment_id: String,
}

/// Error returned by the issuer or forwarded on a declined transaction.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionErrorResponse {
    #[serde(rename = "_model")]
    #[schema(example = "x_requests")]
    pub model: String,
    #[serde(rename = "_id")]
    #[schema(value_type = Object)]
    pub request_id: serde_json::Value,
    #[schema(example = 422)]
    pub status: u16,
    /// The issuer's message, or its whole response body when it had none.
    #[schema(value_type = Object)]
    pub error: serde_json::Value,
}

/// Generic error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Unauthorized")]
    pub error: String,
    pub message: Option<String>,
}
