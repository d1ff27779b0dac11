pub mod ack;
pub mod health;
pub mod openapi;
pub mod proxy;
pub mod schemas;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cardrelay_delivery::{AckRegistry, DeliveryLauncher};
use cardrelay_issuer::IssuerClient;

use crate::error::ServerError;

use self::openapi::ApiDoc;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Acknowledgment signals, shared with the delivery workers.
    pub registry: Arc<AckRegistry>,
    /// Starts background deliveries of result payloads.
    pub launcher: DeliveryLauncher,
    /// Card issuer client.
    pub issuer: Arc<IssuerClient>,
    /// Shared token required on inbound calls (None disables the check).
    pub auth_token: Option<Arc<str>>,
}

impl AppState {
    /// Check a caller-supplied token against the configured one.
    pub fn authorize(&self, supplied: Option<&str>) -> Result<(), ServerError> {
        match &self.auth_token {
            Some(expected) if supplied != Some(&**expected) => Err(ServerError::Unauthorized),
            _ => Ok(()),
        }
    }
}

/// Build the Axum router with all API routes, middleware, and Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/proxy", post(proxy::proxy))
        .route("/ack", post(ack::acknowledge))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
