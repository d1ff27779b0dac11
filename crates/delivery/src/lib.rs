//! Reliable downstream delivery for cardrelay.
//!
//! After a transaction completes, its result payload is handed to a
//! [`DeliveryLauncher`], which spawns a [`DeliveryWorker`] and returns
//! immediately. The worker posts the payload to the webhook target through an
//! [`AttemptExecutor`], then waits on the key's [`AckSignal`] in the shared
//! [`AckRegistry`] for the receiver to call back. Unacknowledged attempts are
//! retried with exponential [`BackoffPolicy`] delays until the
//! [`RetryPolicy`] budget runs out.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cardrelay_core::DeliveryKey;
//! use cardrelay_delivery::{AckRegistry, DeliveryLauncher, DeliveryWorker, RetryPolicy, WebhookExecutor};
//!
//! # async fn demo() -> Result<(), cardrelay_delivery::DeliveryError> {
//! let registry = Arc::new(AckRegistry::new());
//! let executor = Arc::new(WebhookExecutor::new("https://consumer.example.com/hook")?);
//! let worker = DeliveryWorker::new(Arc::clone(&registry), executor, RetryPolicy::default());
//! let launcher = DeliveryLauncher::new(Arc::new(worker));
//!
//! launcher.launch(DeliveryKey::new("PAY-1"), serde_json::json!({"ok": true}));
//!
//! // Later, from the acknowledgment endpoint:
//! registry.acknowledge(&DeliveryKey::new("PAY-1"));
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod error;
pub mod executor;
pub mod launcher;
pub mod metrics;
pub mod policy;
pub mod registry;
pub mod signal;
pub mod worker;

pub use backoff::BackoffPolicy;
pub use error::DeliveryError;
pub use executor::{AttemptExecutor, AttemptOutcome, WebhookExecutor};
pub use launcher::DeliveryLauncher;
pub use metrics::{DeliveryMetrics, DeliveryMetricsSnapshot};
pub use policy::RetryPolicy;
pub use registry::AckRegistry;
pub use signal::AckSignal;
pub use worker::DeliveryWorker;
