use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{DeliveryId, DeliveryKey};

/// Field injected into every outbound payload carrying the [`DeliveryId`].
pub const DELIVERY_ID_FIELD: &str = "delivery_id";

/// Field injected into every outbound payload carrying the 1-based attempt number.
pub const DELIVERY_ATTEMPT_FIELD: &str = "delivery_attempt";

/// Lifecycle of a single delivery unit.
///
/// `Acknowledged` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// An outbound attempt is in flight.
    Attempting,
    /// The attempt completed and the worker waits for the receiver's acknowledgment.
    WaitingForAck,
    /// The acknowledgment window elapsed; the worker is backing off.
    Retrying,
    /// The receiver acknowledged the delivery.
    Acknowledged,
    /// Every permitted attempt went unacknowledged.
    Exhausted,
}

impl DeliveryState {
    /// Returns `true` for `Acknowledged` and `Exhausted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Acknowledged | Self::Exhausted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attempting => "attempting",
            Self::WaitingForAck => "waiting_for_ack",
            Self::Retrying => "retrying",
            Self::Acknowledged => "acknowledged",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one outbound attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub key: DeliveryKey,
    pub id: DeliveryId,
    /// 1-based, strictly increasing within a delivery unit.
    pub attempt: u32,
    pub payload: serde_json::Value,
}

impl DeliveryAttempt {
    #[must_use]
    pub fn new(key: DeliveryKey, id: DeliveryId, attempt: u32, payload: serde_json::Value) -> Self {
        Self {
            key,
            id,
            attempt,
            payload,
        }
    }

    /// Render the wire body: the payload with the delivery id and attempt
    /// number injected.
    ///
    /// Object payloads get the two fields added in place (overwriting any
    /// existing fields of the same name). Any other JSON value is wrapped
    /// under a `payload` field so the injected fields always sit at the top
    /// level.
    #[must_use]
    pub fn body(&self) -> serde_json::Value {
        let mut body = match &self.payload {
            serde_json::Value::Object(map) => map.clone(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("payload".to_owned(), other.clone());
                map
            }
        };
        body.insert(
            DELIVERY_ID_FIELD.to_owned(),
            serde_json::Value::String(self.id.to_string()),
        );
        body.insert(
            DELIVERY_ATTEMPT_FIELD.to_owned(),
            serde_json::Value::from(self.attempt),
        );
        serde_json::Value::Object(body)
    }
}

/// Final result of a delivery worker run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub key: DeliveryKey,
    pub id: DeliveryId,
    /// Number of attempts actually sent.
    pub attempts: u32,
    /// Terminal state reached.
    pub state: DeliveryState,
    /// Wall-clock time from the first attempt to termination.
    pub elapsed: Duration,
}

impl DeliveryReport {
    pub fn is_acknowledged(&self) -> bool {
        self.state == DeliveryState::Acknowledged
    }
}
