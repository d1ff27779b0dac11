use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::error::DeliveryError;

/// Result of a single outbound delivery attempt.
///
/// Any HTTP response counts as `Delivered`, whatever its status; only the
/// receiver's explicit acknowledgment confirms success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The target answered.
    Delivered { status: u16, body: String },
    /// The call could not be completed (timeout, connection refused, DNS, ...).
    TransportFailure { reason: String },
}

impl AttemptOutcome {
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }
}

/// Performs one delivery attempt of a JSON body to a fixed target.
///
/// Implementations must not return errors: transport problems are reported
/// as [`AttemptOutcome::TransportFailure`] so the worker's control flow is
/// the same for every attempt.
#[async_trait]
pub trait AttemptExecutor: Send + Sync {
    /// Human-readable description of the target, used in logs.
    fn target(&self) -> &str;

    /// Send `body` to the target, giving up after `timeout`.
    async fn attempt(&self, body: &serde_json::Value, timeout: Duration) -> AttemptOutcome;
}

/// [`AttemptExecutor`] that `POST`s the body as JSON to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookExecutor {
    url: String,
    client: Client,
}

impl WebhookExecutor {
    /// Create an executor for `url` with a default HTTP client.
    pub fn new(url: impl Into<String>) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Self::with_client(url, client)
    }

    /// Create an executor for `url` sharing an existing HTTP client.
    pub fn with_client(url: impl Into<String>, client: Client) -> Result<Self, DeliveryError> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(DeliveryError::InvalidTarget("webhook url is empty".into()));
        }
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AttemptExecutor for WebhookExecutor {
    fn target(&self) -> &str {
        &self.url
    }

    #[instrument(skip(self, body), fields(url = %self.url))]
    async fn attempt(&self, body: &serde_json::Value, timeout: Duration) -> AttemptOutcome {
        let result = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(body)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let reason = describe_transport_error(&e, timeout);
                warn!(error = %reason, "webhook delivery attempt failed");
                return AttemptOutcome::TransportFailure { reason };
            }
        };

        let status = response.status().as_u16();
        // A body that cannot be read still means the target answered.
        let body = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(status, error = %e, "could not read webhook response body");
                String::new()
            }
        };

        debug!(status, "webhook delivery attempt completed");
        AttemptOutcome::Delivered { status, body }
    }
}

fn describe_transport_error(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        format!("timed out after {timeout:?}")
    } else if err.is_connect() {
        format!("connection error: {err}")
    } else {
        format!("HTTP error: {err}")
    }
}
