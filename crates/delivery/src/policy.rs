use std::time::Duration;

use crate::backoff::BackoffPolicy;

/// Retry budget and timing for one delivery unit.
///
/// # Examples
///
/// ```
/// use cardrelay_delivery::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Always at least 1.
    pub max_attempts: u32,
    /// How long to wait for an acknowledgment after each attempt.
    pub ack_timeout: Duration,
    /// Backoff base: the un-jittered delay after the first unacknowledged attempt.
    pub backoff_base: Duration,
    /// Lower bound on any backoff delay.
    pub backoff_floor: Duration,
    /// Maximum wall-clock time for one outbound HTTP call.
    pub network_timeout: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
    pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(30);
    pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);
    pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

    /// Backoff policy derived from this retry policy.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.backoff_base).with_floor(self.backoff_floor)
    }

    /// Attempt budget, never below one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Upper bound on how long a worker can run under this policy.
    pub fn max_elapsed(&self) -> Duration {
        let backoff = self.backoff();
        let attempts = self.attempts();
        let per_attempt = self.network_timeout.saturating_add(self.ack_timeout);
        (1..attempts).fold(per_attempt.saturating_mul(attempts), |total, attempt| {
            total.saturating_add(backoff.max_delay(attempt))
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            ack_timeout: Self::DEFAULT_ACK_TIMEOUT,
            backoff_base: Self::DEFAULT_BACKOFF_BASE,
            backoff_floor: Duration::from_secs(1),
            network_timeout: Self::DEFAULT_NETWORK_TIMEOUT,
        }
    }
}
