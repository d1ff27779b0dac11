use thiserror::Error;

/// Errors raised while interpreting inbound payloads.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field was absent from the request body.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field was present but could not be interpreted.
    #[error("invalid field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// The request body was not a JSON object.
    #[error("request body must be a JSON object")]
    NotAnObject,
}
