use thiserror::Error;

/// Errors surfaced while setting up delivery components.
///
/// Failures of individual attempts are never reported through this type; the
/// executor turns them into [`AttemptOutcome`](crate::AttemptOutcome) data.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The webhook target is not usable.
    #[error("invalid webhook target: {0}")]
    InvalidTarget(String),

    /// No async runtime was available to spawn a worker on.
    #[error("no async runtime available: {0}")]
    NoRuntime(String),
}
