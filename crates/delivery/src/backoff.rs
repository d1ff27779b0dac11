use std::time::Duration;

use rand::Rng;

/// Exponential backoff with symmetric random jitter.
///
/// The delay after attempt `a` (1-based) is `base * 2^(a-1)`, perturbed by a
/// uniformly random factor in `[1 - jitter, 1 + jitter]`, then raised to at
/// least `floor`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the second attempt, before jitter.
    pub base: Duration,
    /// Relative jitter amplitude; `0.2` means ±20%.
    pub jitter: f64,
    /// Lower bound applied after jitter.
    pub floor: Duration,
}

/// Exponents above this saturate; the resulting delays are already absurd.
const MAX_EXPONENT: u32 = 31;

impl BackoffPolicy {
    /// Create a policy with ±20% jitter and a one-second floor.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            jitter: 0.2,
            floor: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_floor(mut self, floor: Duration) -> Self {
        self.floor = floor;
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Un-jittered delay after `attempt`: `base * 2^(attempt-1)`.
    ///
    /// Attempt `0` is treated as `1`.
    pub fn nominal(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(MAX_EXPONENT);
        self.base.saturating_mul(1u32 << exponent)
    }

    /// Delay after `attempt` for a given jitter sample.
    ///
    /// `unit` is a point in `[-1.0, 1.0]`; values outside are clamped. `-1.0`
    /// yields the low edge of the jitter window and `1.0` the high edge.
    pub fn delay_with(&self, attempt: u32, unit: f64) -> Duration {
        let nominal = self.nominal(attempt).as_secs_f64();
        let factor = 1.0 + self.jitter * unit.clamp(-1.0, 1.0);
        let jittered = Duration::try_from_secs_f64(nominal * factor).unwrap_or(Duration::MAX);
        jittered.max(self.floor)
    }

    /// Delay to sleep after `attempt` went unacknowledged, with fresh jitter.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let unit = rand::thread_rng().gen_range(-1.0..=1.0);
        self.delay_with(attempt, unit)
    }

    /// Largest delay this policy can produce after `attempt`.
    pub fn max_delay(&self, attempt: u32) -> Duration {
        self.delay_with(attempt, 1.0)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}
