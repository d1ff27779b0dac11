use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use cardrelay_core::DeliveryKey;

use crate::signal::AckSignal;

/// Process-local map from [`DeliveryKey`] to its [`AckSignal`].
///
/// Shared between delivery workers (which create, wait on, and release
/// signals) and the acknowledgment endpoint (which only ever sets them).
/// Nothing is persisted.
#[derive(Debug, Default)]
pub struct AckRegistry {
    signals: DashMap<DeliveryKey, Arc<AckSignal>>,
}

impl AckRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the signal for `key`, creating an unset one if none exists.
    ///
    /// Concurrent callers with the same key always receive the same instance:
    /// the `entry` API holds the shard lock across the lookup and the insert.
    pub fn get_or_create(&self, key: &DeliveryKey) -> Arc<AckSignal> {
        let entry = self
            .signals
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AckSignal::new()));
        Arc::clone(entry.value())
    }

    /// Acknowledge `key`: look up (or create) its signal and set it.
    ///
    /// Safe to call before any worker exists, repeatedly, or after the worker
    /// has released the key. In the last case the freshly created signal is
    /// never observed and stays in the map until a later delivery with the
    /// same key releases it.
    ///
    /// Returns `true` if this call set the signal, `false` if it was already set.
    pub fn acknowledge(&self, key: &DeliveryKey) -> bool {
        let first = self.get_or_create(key).set();
        debug!(delivery_key = %key, first, "acknowledgment recorded");
        first
    }

    /// Remove the mapping for `key`, if any. Removing an absent key is a no-op.
    pub fn remove(&self, key: &DeliveryKey) {
        self.signals.remove(key);
    }

    /// Remove the mapping for `key` only if it still points at `signal`.
    ///
    /// Workers release through this so a finished worker never drops a signal
    /// that a newer delivery with the same key has since installed.
    /// Returns `true` if the mapping was removed.
    pub fn release(&self, key: &DeliveryKey, signal: &Arc<AckSignal>) -> bool {
        self.signals
            .remove_if(key, |_, current| Arc::ptr_eq(current, signal))
            .is_some()
    }

    /// Number of signals currently held.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
