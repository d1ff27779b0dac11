use thiserror::Error;

/// Errors raised while calling the issuing API.
#[derive(Debug, Error)]
pub enum IssuerError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The issuer answered with a body that is not JSON.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// The client is missing required settings.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}
