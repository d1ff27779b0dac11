use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use cardrelay_core::{DeliveryAttempt, DeliveryId, DeliveryKey, DeliveryReport, DeliveryState};

use crate::executor::{AttemptExecutor, AttemptOutcome};
use crate::metrics::DeliveryMetrics;
use crate::policy::RetryPolicy;
use crate::registry::AckRegistry;

/// Delivers one payload per run until it is acknowledged or the retry budget
/// is spent.
///
/// Each run mints a [`DeliveryId`], sends attempt 1, then waits on the key's
/// acknowledgment signal for [`RetryPolicy::ack_timeout`]. If no
/// acknowledgment arrives it sleeps for the backoff delay and sends the next
/// attempt, up to [`RetryPolicy::max_attempts`]. The run always ends in
/// [`DeliveryState::Acknowledged`] or [`DeliveryState::Exhausted`] and
/// releases the key's signal from the registry on the way out.
pub struct DeliveryWorker {
    registry: Arc<AckRegistry>,
    executor: Arc<dyn AttemptExecutor>,
    policy: RetryPolicy,
    metrics: Arc<DeliveryMetrics>,
}

impl DeliveryWorker {
    pub fn new(
        registry: Arc<AckRegistry>,
        executor: Arc<dyn AttemptExecutor>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            registry,
            executor,
            policy,
            metrics: Arc::new(DeliveryMetrics::default()),
        }
    }

    /// Record outcomes into a shared metrics instance.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<DeliveryMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &Arc<AckRegistry> {
        &self.registry
    }

    pub fn executor(&self) -> &Arc<dyn AttemptExecutor> {
        &self.executor
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn metrics(&self) -> &Arc<DeliveryMetrics> {
        &self.metrics
    }

    /// Run one delivery unit to completion.
    #[instrument(
        skip(self, payload),
        fields(delivery_key = %key, delivery_id = tracing::field::Empty)
    )]
    pub async fn run(&self, key: DeliveryKey, payload: serde_json::Value) -> DeliveryReport {
        let id = DeliveryId::new();
        tracing::Span::current().record("delivery_id", tracing::field::display(id));

        self.metrics.worker_started();
        let signal = self.registry.get_or_create(&key);
        let backoff = self.policy.backoff();
        let max_attempts = self.policy.attempts();
        let started = Instant::now();

        let mut attempt = 1;
        let state = loop {
            let record = DeliveryAttempt::new(key.clone(), id, attempt, payload.clone());
            enter(DeliveryState::Attempting, attempt);
            self.send(&record).await;

            enter(DeliveryState::WaitingForAck, attempt);
            if signal.wait(self.policy.ack_timeout).await {
                break DeliveryState::Acknowledged;
            }

            if attempt >= max_attempts {
                break DeliveryState::Exhausted;
            }

            enter(DeliveryState::Retrying, attempt);
            let delay = backoff.next_delay(attempt);
            debug!(attempt, delay_ms = %delay.as_millis(), "no acknowledgment, backing off");
            tokio::time::sleep(delay).await;
            attempt += 1;
        };

        self.registry.release(&key, &signal);
        self.metrics.worker_finished();

        let elapsed = started.elapsed();
        match state {
            DeliveryState::Acknowledged => {
                self.metrics.increment_acknowledged();
                info!(attempts = attempt, elapsed_ms = %elapsed.as_millis(), "delivery acknowledged");
            }
            _ => {
                self.metrics.increment_exhausted();
                error!(
                    attempts = attempt,
                    elapsed_ms = %elapsed.as_millis(),
                    target = %self.executor.target(),
                    "delivery exhausted without acknowledgment"
                );
            }
        }

        DeliveryReport {
            key,
            id,
            attempts: attempt,
            state,
            elapsed,
        }
    }

    /// Send one attempt. Never fails: transport problems are logged and the
    /// loop carries on to the acknowledgment wait.
    async fn send(&self, record: &DeliveryAttempt) {
        self.metrics.increment_attempts();
        let timeout = self.policy.network_timeout;

        // Executors are expected to honor the timeout themselves; this bounds
        // the ones that do not.
        let outcome =
            match tokio::time::timeout(timeout, self.executor.attempt(&record.body(), timeout))
                .await
            {
                Ok(outcome) => outcome,
                Err(_elapsed) => AttemptOutcome::TransportFailure {
                    reason: format!("timed out after {timeout:?}"),
                },
            };

        match outcome {
            AttemptOutcome::Delivered { status, .. } => {
                debug!(attempt = record.attempt, status, "attempt delivered");
            }
            AttemptOutcome::TransportFailure { reason } => {
                self.metrics.increment_transport_failures();
                warn!(attempt = record.attempt, error = %reason, "attempt failed in transport");
            }
        }
    }
}

fn enter(state: DeliveryState, attempt: u32) {
    debug!(%state, attempt, "delivery state");
}
