use std::time::Duration;

/// Merchant code sent when none is configured.
pub const DEFAULT_MERCHANT_CODE: &str = "*";

/// Configuration for the issuing API client.
#[derive(Clone)]
pub struct IssuerConfig {
    /// Endpoint that issues virtual cards. Required unless `test_mode` is set.
    pub url: Option<String>,

    /// HTTP Basic username.
    pub username: String,

    /// HTTP Basic password.
    pub password: String,

    /// Merchant code sent with every request.
    pub merchant_code: String,

    /// When `true`, no network call is made and a fixed successful card is
    /// returned.
    pub test_mode: bool,

    /// Request timeout.
    pub timeout: Duration,
}

impl IssuerConfig {
    /// Create a configuration targeting the given URL.
    ///
    /// Defaults to empty credentials, merchant code `*`, a 30-second timeout,
    /// and test mode off.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            test_mode: false,
            ..Self::test_mode()
        }
    }

    /// A configuration that never touches the network.
    pub fn test_mode() -> Self {
        Self {
            url: None,
            username: String::new(),
            password: String::new(),
            merchant_code: DEFAULT_MERCHANT_CODE.to_owned(),
            test_mode: true,
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_merchant_code(mut self, merchant_code: impl Into<String>) -> Self {
        self.merchant_code = merchant_code.into();
        self
    }

    #[must_use]
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for IssuerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("merchant_code", &self.merchant_code)
            .field("test_mode", &self.test_mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}
