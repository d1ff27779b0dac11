use tracing::warn;

use super::CardRelayConfig;

/// Environment variables that override file settings.
pub const ENV_AUTH_TOKEN: &str = "AUTH_TOKEN";
pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const ENV_TEST_MODE: &str = "TEST_MODE";
pub const ENV_ISSUER_URL: &str = "WEX_API_URL";
pub const ENV_ISSUER_USERNAME: &str = "WEX_USERNAME";
pub const ENV_ISSUER_PASSWORD: &str = "WEX_PASSWORD";
pub const ENV_MERCHANT_CODE: &str = "MERCHANT_CODE";
pub const ENV_PORT: &str = "PORT";
pub const ENV_MAX_ATTEMPTS: &str = "DELIVERY_MAX_ATTEMPTS";
pub const ENV_ACK_TIMEOUT: &str = "DELIVERY_ACK_TIMEOUT_SECONDS";
pub const ENV_BACKOFF_BASE: &str = "DELIVERY_BACKOFF_BASE_SECONDS";
pub const ENV_NETWORK_TIMEOUT: &str = "DELIVERY_NETWORK_TIMEOUT_SECONDS";

impl CardRelayConfig {
    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ENV_AUTH_TOKEN) {
            self.auth.token = Some(token);
        }
        if let Some(url) = lookup(ENV_WEBHOOK_URL) {
            self.delivery.webhook_url = Some(url);
        }
        if let Some(flag) = lookup(ENV_TEST_MODE) {
            self.issuer.test_mode = flag.trim().eq_ignore_ascii_case("true");
        }
        if let Some(url) = lookup(ENV_ISSUER_URL) {
            self.issuer.url = Some(url);
        }
        if let Some(username) = lookup(ENV_ISSUER_USERNAME) {
            self.issuer.username = username;
        }
        if let Some(password) = lookup(ENV_ISSUER_PASSWORD) {
            self.issuer.password = password;
        }
        if let Some(code) = lookup(ENV_MERCHANT_CODE) {
            self.issuer.merchant_code = code;
        }
        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(variable = ENV_PORT, value = %port, "ignoring invalid port"),
            }
        }

        let delivery = &mut self.delivery;
        for (name, slot) in [
            (ENV_MAX_ATTEMPTS, &mut delivery.max_attempts),
            (ENV_ACK_TIMEOUT, &mut delivery.ack_timeout_seconds),
            (ENV_BACKOFF_BASE, &mut delivery.backoff_base_seconds),
            (ENV_NETWORK_TIMEOUT, &mut delivery.network_timeout_seconds),
        ] {
            if let Some(value) = lookup(name) {
                *slot = Some(toml::Value::String(value));
            }
        }
    }
}
