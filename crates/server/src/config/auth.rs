use serde::Deserialize;

/// Shared-token authentication for inbound calls.
///
/// When no token is configured (or it is empty) every request is accepted.
#[derive(Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub token: Option<String>,
}

impl AuthConfig {
    /// The configured token, ignoring an empty value.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
