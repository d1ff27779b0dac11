use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters tracking delivery outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    /// Deliveries handed to the launcher and spawned.
    pub launched: AtomicU64,
    /// Deliveries the launcher could not spawn.
    pub launch_failures: AtomicU64,
    /// Outbound attempts sent (including failed ones).
    pub attempts: AtomicU64,
    /// Attempts that failed at the transport level.
    pub transport_failures: AtomicU64,
    /// Deliveries that ended acknowledged.
    pub acknowledged: AtomicU64,
    /// Deliveries that ran out of attempts.
    pub exhausted: AtomicU64,
    /// Acknowledgment calls received.
    pub acks_received: AtomicU64,
    /// Workers currently running.
    pub in_flight: AtomicU64,
}

impl DeliveryMetrics {
    pub fn increment_launched(&self) {
        self.launched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_launch_failures(&self) {
        self.launch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_attempts(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transport_failures(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_acknowledged(&self) {
        self.acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_acks_received(&self) {
        self.acks_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> DeliveryMetricsSnapshot {
        DeliveryMetricsSnapshot {
            launched: self.launched.load(Ordering::Relaxed),
            launch_failures: self.launch_failures.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
            acknowledged: self.acknowledged.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
            acks_received: self.acks_received.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
        }
    }
}

/// A plain-data copy of [`DeliveryMetrics`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryMetricsSnapshot {
    pub launched: u64,
    pub launch_failures: u64,
    pub attempts: u64,
    pub transport_failures: u64,
    pub acknowledged: u64,
    pub exhausted: u64,
    pub acks_received: u64,
    pub in_flight: u64,
}
