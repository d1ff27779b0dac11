#![allow(clippy::needless_for_each)]

use cardrelay_core::CardResult;

use super::schemas::{
    AckRequest, AckResponse, ErrorResponse, HealthResponse, MetricsResponse,
    TransactionErrorResponse,
};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "cardrelay API",
        version = "0.1.0",
        description = "Issue virtual cards for payment requests and deliver the results to a downstream webhook until acknowledged.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health and metrics"),
        (name = "Proxy", description = "Virtual card issuing"),
        (name = "Delivery", description = "Delivery acknowledgments")
    ),
    paths(
        super::health::health,
        super::health::metrics,
        super::proxy::proxy,
        super::ack::acknowledge,
    ),
    components(schemas(
        AckRequest,
        AckResponse,
        CardResult,
        ErrorResponse,
        HealthResponse,
        MetricsResponse,
        TransactionErrorResponse,
    ))
)]
pub struct ApiDoc;
