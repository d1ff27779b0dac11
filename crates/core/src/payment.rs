use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::DeliveryKey;

/// Model name the downstream consumer expects on every result payload.
pub const RESULT_MODEL: &str = "x_requests";

/// Body field carrying the shared auth token on inbound requests.
pub const AUTH_TOKEN_FIELD: &str = "x_studio_proxy_auth_token";

/// A payment request as extracted from the inbound proxy call.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    /// Caller-side record id (`_id`, falling back to `id`). Echoed back verbatim.
    pub request_id: Value,
    pub payment_id: String,
    pub hauler_name: String,
    pub amount: f64,
    pub invoice_number: String,
    pub employee: Option<String>,
}

impl PaymentRequest {
    /// Extract the payment fields from a proxy request body.
    pub fn from_json(body: &Value) -> Result<Self, CoreError> {
        let map = body.as_object().ok_or(CoreError::NotAnObject)?;

        let request_id = match map.get("_id") {
            Some(v) if is_truthy(v) => v.clone(),
            _ => map.get("id").cloned().unwrap_or(Value::Null),
        };

        Ok(Self {
            request_id,
            payment_id: required_string(map, "x_name")?,
            hauler_name: required_string(map, "x_studio_vendor_name")?,
            amount: required_amount(map, "x_studio_vendor_payment_amount_requested")?,
            invoice_number: required_string(
                map,
                "x_studio_hauler_invoice_or_remittance_advice_memo",
            )?,
            employee: map
                .get("x_studio_employee_name")
                .and_then(Value::as_str)
                .map(str::to_owned),
        })
    }

    /// The delivery key for the result of this payment.
    pub fn delivery_key(&self) -> DeliveryKey {
        DeliveryKey::new(self.payment_id.clone())
    }
}

/// Read the shared auth token from a request body, if present.
pub fn auth_token(body: &Value) -> Option<&str> {
    body.get(AUTH_TOKEN_FIELD).and_then(Value::as_str)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn required_string(map: &Map<String, Value>, field: &'static str) -> Result<String, CoreError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(CoreError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(CoreError::InvalidField {
            field,
            reason: format!("expected a string, got {other}"),
        }),
    }
}

fn required_amount(map: &Map<String, Value>, field: &'static str) -> Result<f64, CoreError> {
    let amount = match map.get(field) {
        None | Some(Value::Null) => return Err(CoreError::MissingField(field)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match amount {
        Some(a) if a.is_finite() => Ok(a),
        _ => Err(CoreError::InvalidField {
            field,
            reason: "could not convert to a number".to_owned(),
        }),
    }
}

/// Virtual card details returned by the issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualCard {
    pub number: Option<String>,
    pub security_code: Option<String>,
    /// RFC 3339 timestamp, e.g. `2027-09-01T00:00:00Z`.
    pub expiration: String,
}

impl VirtualCard {
    /// Split the expiration timestamp into `(year, month)` strings.
    pub fn expiration_parts(&self) -> Result<(String, String), CoreError> {
        let date = self.expiration.split('T').next().unwrap_or_default();
        let mut parts = date.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(year), Some(month), Some(_)) if !year.is_empty() && !month.is_empty() => {
                Ok((year.to_owned(), month.to_owned()))
            }
            _ => Err(CoreError::InvalidField {
                field: "virtual_card.expiration",
                reason: format!("unexpected date format: {}", self.expiration),
            }),
        }
    }
}

/// Result payload handed to the caller and delivered to the downstream webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CardResult {
    #[serde(rename = "_model")]
    pub model: String,
    #[serde(rename = "_id")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub request_id: Value,
    pub status: u16,
    pub card_number: Option<String>,
    pub expiration_month: String,
    pub expiration_year: String,
    pub security_code: Option<String>,
    pub payment_id: String,
    /// Amount rendered with two decimals.
    pub amount: String,
    pub hauler_name: String,
    pub employee: Option<String>,
    pub invoice_number: String,
}

impl CardResult {
    pub fn new(request: &PaymentRequest, status: u16, card: &VirtualCard) -> Result<Self, CoreError> {
        let (year, month) = card.expiration_parts()?;
        Ok(Self {
            model: RESULT_MODEL.to_owned(),
            request_id: request.request_id.clone(),
            status,
            card_number: card.number.clone(),
            expiration_month: month,
            expiration_year: year,
            security_code: card.security_code.clone(),
            payment_id: request.payment_id.clone(),
            amount: format!("{:.2}", request.amount),
            hauler_name: request.hauler_name.clone(),
            employee: request.employee.clone(),
            invoice_number: request.invoice_number.clone(),
        })
    }
}
