pub mod delivery;
pub mod error;
pub mod payment;
pub mod types;

pub use delivery::{
    DELIVERY_ATTEMPT_FIELD, DELIVERY_ID_FIELD, DeliveryAttempt, DeliveryReport, DeliveryState,
};
pub use error::CoreError;
pub use payment::{AUTH_TOKEN_FIELD, CardResult, PaymentRequest, RESULT_MODEL, VirtualCard, auth_token};
pub use types::{DeliveryId, DeliveryKey};
