use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::{HealthResponse, MetricsResponse};

fn build_metrics_response(state: &AppState) -> MetricsResponse {
    let snap = state.launcher.metrics().snapshot();
    MetricsResponse::new(&snap, state.registry.len())
}

/// `GET /health` -- returns service status together with delivery metrics.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns service status and a snapshot of delivery metrics.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "ok".into(),
        delivery: build_metrics_response(&state),
    };

    (StatusCode::OK, Json(body))
}

/// `GET /metrics` -- returns delivery metrics as JSON.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    summary = "Delivery metrics",
    description = "Returns current delivery counters for monitoring.",
    responses(
        (status = 200, description = "Current metric counters", body = MetricsResponse)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(build_metrics_response(&state)))
}
