use std::time::Duration;

use serde::Deserialize;

use cardrelay_issuer::IssuerConfig;
use cardrelay_issuer::config::DEFAULT_MERCHANT_CODE;

/// Card issuer API configuration (`[issuer]`).
#[derive(Clone, Deserialize)]
pub struct IssuerSection {
    /// Issuer endpoint. Required unless `test_mode` is set.
    pub url: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_merchant_code")]
    pub merchant_code: String,
    /// Return a fixed successful card instead of calling the issuer.
    #[serde(default)]
    pub test_mode: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for IssuerSection {
    fn default() -> Self {
        Self {
            url: None,
            username: String::new(),
            password: String::new(),
            merchant_code: default_merchant_code(),
            test_mode: false,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl IssuerSection {
    /// Build the client configuration.
    pub fn to_issuer_config(&self) -> IssuerConfig {
        let config = match &self.url {
            Some(url) => IssuerConfig::new(url.clone()),
            None => IssuerConfig::test_mode(),
        };
        config
            .with_credentials(self.username.clone(), self.password.clone())
            .with_merchant_code(self.merchant_code.clone())
            .with_test_mode(self.test_mode)
            .with_timeout(Duration::from_secs(self.timeout_seconds.max(1)))
    }
}

impl std::fmt::Debug for IssuerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerSection")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("merchant_code", &self.merchant_code)
            .field("test_mode", &self.test_mode)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

fn default_merchant_code() -> String {
    DEFAULT_MERCHANT_CODE.to_owned()
}

fn default_timeout_seconds() -> u64 {
    30
}
