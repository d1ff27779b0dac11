mod auth;
mod delivery;
mod env;
mod issuer;
mod server;


pub use auth::*;
pub use delivery::*;
pub use env::*;
pub use issuer::*;
pub use server::*;

use serde::Deserialize;

/// Top-level configuration for the cardrelay server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct CardRelayConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Downstream webhook delivery configuration.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Card issuer API configuration.
    #[serde(default)]
    pub issuer: IssuerSection,
    /// Shared-token authentication.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl CardRelayConfig {
    /// Parse a TOML document. An empty document yields all defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
