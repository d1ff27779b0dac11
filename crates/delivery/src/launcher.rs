use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use cardrelay_core::{DeliveryKey, DeliveryReport};

use crate::error::DeliveryError;
use crate::executor::{AttemptExecutor, AttemptOutcome};
use crate::metrics::DeliveryMetrics;
use crate::worker::DeliveryWorker;

/// Fire-and-forget entry point for deliveries.
///
/// [`launch`](Self::launch) spawns a [`DeliveryWorker`] run on the current
/// tokio runtime and returns at once. Failing to spawn is logged and counted;
/// it never reaches the caller, whose own response does not depend on the
/// delivery.
///
/// By default any number of deliveries may run at once. With
/// [`with_max_in_flight`](Self::with_max_in_flight) a semaphore bounds how
/// many workers run concurrently; the permit is acquired inside the spawned
/// task, so `launch` still never waits.
#[derive(Clone)]
pub struct DeliveryLauncher {
    worker: Arc<DeliveryWorker>,
    gate: Option<Arc<Semaphore>>,
}

impl DeliveryLauncher {
    pub fn new(worker: Arc<DeliveryWorker>) -> Self {
        Self { worker, gate: None }
    }

    /// Bound the number of concurrently running workers. `0` leaves the
    /// launcher unbounded.
    #[must_use]
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.gate = (max_in_flight > 0).then(|| Arc::new(Semaphore::new(max_in_flight)));
        self
    }

    pub fn worker(&self) -> &Arc<DeliveryWorker> {
        &self.worker
    }

    pub fn metrics(&self) -> &Arc<DeliveryMetrics> {
        self.worker.metrics()
    }

    /// Start delivering `payload` under `key` in the background.
    ///
    /// Returns the task handle, or `None` if no runtime was available.
    /// Dropping the handle detaches the task; the delivery carries on.
    pub fn launch(
        &self,
        key: DeliveryKey,
        payload: serde_json::Value,
    ) -> Option<JoinHandle<DeliveryReport>> {
        let handle = match current_runtime() {
            Ok(handle) => handle,
            Err(e) => {
                self.metrics().increment_launch_failures();
                error!(delivery_key = %key, error = %e, "failed to launch delivery");
                return None;
            }
        };

        self.metrics().increment_launched();
        debug!(delivery_key = %key, "launching delivery");

        let worker = Arc::clone(&self.worker);
        let gate = self.gate.clone();
        Some(handle.spawn(async move {
            // The semaphore is never closed, so acquisition only fails if it
            // somehow is; run ungated in that case.
            let _permit = match gate {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            worker.run(key, payload).await
        }))
    }

    /// Send `payload` once to the webhook target without the acknowledgment
    /// protocol. Used to forward failed transactions.
    ///
    /// Returns the task handle, or `None` if no runtime was available.
    pub fn forward_once(&self, payload: serde_json::Value) -> Option<JoinHandle<AttemptOutcome>> {
        let handle = match current_runtime() {
            Ok(handle) => handle,
            Err(e) => {
                error!(error = %e, "failed to forward payload");
                return None;
            }
        };

        let executor: Arc<dyn AttemptExecutor> = Arc::clone(self.worker.executor());
        let timeout = self.worker.policy().network_timeout;
        Some(handle.spawn(async move {
            let outcome = executor.attempt(&payload, timeout).await;
            match &outcome {
                AttemptOutcome::Delivered { status, .. } => {
                    info!(status, "forwarded payload to webhook");
                }
                AttemptOutcome::TransportFailure { reason } => {
                    warn!(error = %reason, "failed to forward payload to webhook");
                }
            }
            outcome
        }))
    }
}

fn current_runtime() -> Result<Handle, DeliveryError> {
    Handle::try_current().map_err(|e| DeliveryError::NoRuntime(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use cardrelay_core::DeliveryState;

    use super::*;
    use crate::policy::RetryPolicy;
    use crate::registry::AckRegistry;

    /// Sleeps for `latency`, tracking how many calls overlap.
    struct SlowExecutor {
        latency: Duration,
        current: AtomicU32,
        peak: AtomicU32,
        calls: AtomicU32,
    }

    impl SlowExecutor {
        fn new(latency: Duration) -> Self {
            Self {
                latency,
                current: AtomicU32::new(0),
                peak: AtomicU32::new(0),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl AttemptExecutor for SlowExecutor {
        fn target(&self) -> &str {
            "mock://slow"
        }

        async fn attempt(&self, _body: &serde_json::Value, _timeout: Duration) -> AttemptOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.current.fetch_sub(1, Ordering::SeqCst);
            AttemptOutcome::Delivered {
                status: 200,
                body: String::new(),
            }
        }
    }

    fn one_shot_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            ack_timeout: Duration::from_secs(1),
            backoff_base: Duration::from_secs(1),
            backoff_floor: Duration::from_secs(1),
            network_timeout: Duration::from_secs(30),
        }
    }

    fn launcher_with(executor: Arc<SlowExecutor>) -> (DeliveryLauncher, Arc<AckRegistry>) {
        let registry = Arc::new(AckRegistry::new());
        let worker = DeliveryWorker::new(Arc::clone(&registry), executor, one_shot_policy());
        (DeliveryLauncher::new(Arc::new(worker)), registry)
    }

    #[tokio::test(start_paused = true)]
    async fn launch_returns_without_waiting_for_delivery() {
        let executor = Arc::new(SlowExecutor::new(Duration::from_secs(20)));
        let (launcher, _registry) = launcher_with(Arc::clone(&executor));

        let started = tokio::time::Instant::now();
        let handle = launcher
            .launch(DeliveryKey::new("PAY-1"), serde_json::json!({}))
            .expect("runtime is available");
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(!handle.is_finished());

        let report = handle.await.expect("worker should not panic");
        assert_eq!(report.state, DeliveryState::Exhausted);
        assert_eq!(launcher.metrics().snapshot().launched, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn acknowledgment_reaches_launched_worker() {
        let executor = Arc::new(SlowExecutor::new(Duration::from_millis(10)));
        let (launcher, registry) = launcher_with(executor);

        let key = DeliveryKey::new("PAY-2");
        let handle = launcher
            .launch(key.clone(), serde_json::json!({"x": 1}))
            .expect("runtime is available");
        tokio::time::sleep(Duration::from_millis(50)).await;
        registry.acknowledge(&key);

        let report = handle.await.unwrap();
        assert_eq!(report.state, DeliveryState::Acknowledged);
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unbounded_by_default() {
        let executor = Arc::new(SlowExecutor::new(Duration::from_secs(1)));
        let (launcher, _registry) = launcher_with(Arc::clone(&executor));

        let handles: Vec<_> = (0..8)
            .filter_map(|i| {
                launcher.launch(DeliveryKey::new(format!("PAY-{i}")), serde_json::json!({}))
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(executor.peak.load(Ordering::SeqCst), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn max_in_flight_bounds_concurrent_workers() {
        let executor = Arc::new(SlowExecutor::new(Duration::from_secs(1)));
        let (launcher, _registry) = launcher_with(Arc::clone(&executor));
        let launcher = launcher.with_max_in_flight(2);

        let started = tokio::time::Instant::now();
        let handles: Vec<_> = (0..6)
            .filter_map(|i| {
                launcher.launch(DeliveryKey::new(format!("PAY-{i}")), serde_json::json!({}))
            })
            .collect();
        // Launching never waits on the gate.
        assert_eq!(started.elapsed(), Duration::ZERO);

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(executor.calls.load(Ordering::SeqCst), 6);
        assert_eq!(executor.peak.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn launch_without_runtime_is_logged_not_raised() {
        let executor = Arc::new(SlowExecutor::new(Duration::from_millis(1)));
        let (launcher, _registry) = launcher_with(executor);

        let handle = launcher.launch(DeliveryKey::new("PAY-x"), serde_json::json!({}));
        assert!(handle.is_none());
        let snap = launcher.metrics().snapshot();
        assert_eq!(snap.launch_failures, 1);
        assert_eq!(snap.launched, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn forward_once_sends_a_single_attempt() {
        let executor = Arc::new(SlowExecutor::new(Duration::from_millis(5)));
        let (launcher, registry) = launcher_with(Arc::clone(&executor));

        let outcome = launcher
            .forward_once(serde_json::json!({"status": 400}))
            .expect("runtime is available")
            .await
            .unwrap();

        assert!(!outcome.is_transport_failure());
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty(), "forwarding does not touch the registry");
    }
}
