use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use cardrelay_delivery::RetryPolicy;

/// Downstream webhook delivery configuration (`[delivery]`).
///
/// Retry settings are kept as raw TOML values so that a bad entry (a string
/// where a number belongs, a negative timeout) degrades to the default with a
/// warning instead of refusing to start.
#[derive(Debug, Default, Deserialize)]
pub struct DeliveryConfig {
    /// Webhook that receives result payloads.
    pub webhook_url: Option<String>,
    /// Total attempts per delivery, including the first.
    pub max_attempts: Option<toml::Value>,
    /// Seconds to wait for an acknowledgment after each attempt.
    pub ack_timeout_seconds: Option<toml::Value>,
    /// Backoff base in seconds.
    pub backoff_base_seconds: Option<toml::Value>,
    /// Per-attempt network timeout in seconds.
    pub network_timeout_seconds: Option<toml::Value>,
    /// Maximum concurrently running deliveries. Absent or `0` means unbounded.
    pub max_in_flight: Option<usize>,
}

impl DeliveryConfig {
    /// Resolve the retry settings, falling back to defaults for anything
    /// absent or invalid.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: positive_count("max_attempts", self.max_attempts.as_ref())
                .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS),
            ack_timeout: positive_seconds("ack_timeout_seconds", self.ack_timeout_seconds.as_ref())
                .unwrap_or(RetryPolicy::DEFAULT_ACK_TIMEOUT),
            backoff_base: positive_seconds(
                "backoff_base_seconds",
                self.backoff_base_seconds.as_ref(),
            )
            .unwrap_or(RetryPolicy::DEFAULT_BACKOFF_BASE),
            network_timeout: positive_seconds(
                "network_timeout_seconds",
                self.network_timeout_seconds.as_ref(),
            )
            .unwrap_or(RetryPolicy::DEFAULT_NETWORK_TIMEOUT),
            ..RetryPolicy::default()
        }
    }

    /// The admission limit, if any.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.unwrap_or(0)
    }
}

fn positive_count(name: &str, raw: Option<&toml::Value>) -> Option<u32> {
    let raw = raw?;
    let parsed = match raw {
        toml::Value::Integer(n) => u32::try_from(*n).ok(),
        toml::Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n > 0 => Some(n),
        _ => {
            warn!(setting = name, value = %raw, "invalid delivery setting, using default");
            None
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn positive_seconds(name: &str, raw: Option<&toml::Value>) -> Option<Duration> {
    let raw = raw?;
    let seconds = match raw {
        toml::Value::Integer(n) => Some(*n as f64),
        toml::Value::Float(f) => Some(*f),
        toml::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    let resolved = seconds
        .filter(|s| s.is_finite() && *s > 0.0)
        .and_then(|s| Duration::try_from_secs_f64(s).ok());
    if resolved.is_none() {
        warn!(setting = name, value = %raw, "invalid delivery setting, using default");
    }
    resolved
}
