use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cardrelay_core::{PaymentRequest, VirtualCard};

/// Prefix of `detailed_response_message` on a successful issue.
pub const SUCCESS_PREFIX: &str = "Success:";

/// One invoice line on an issue request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_number: String,
    /// UTC timestamp in RFC 3339 form with a `Z` suffix.
    pub invoice_date: String,
    pub total_amount: f64,
}

/// Body sent to the issuer to request a virtual card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardIssueRequest {
    pub merchant_code: String,
    pub total_amount: f64,
    /// `[hauler_name, payment_id]`.
    pub user_defined_fields: Vec<String>,
    pub invoices: Vec<Invoice>,
}

impl CardIssueRequest {
    /// Build the request for `payment`, dated now.
    pub fn new(merchant_code: impl Into<String>, payment: &PaymentRequest) -> Self {
        Self::dated(merchant_code, payment, Utc::now())
    }

    /// Build the request for `payment` with an explicit invoice date.
    pub fn dated(
        merchant_code: impl Into<String>,
        payment: &PaymentRequest,
        invoice_date: DateTime<Utc>,
    ) -> Self {
        Self {
            merchant_code: merchant_code.into(),
            total_amount: payment.amount,
            user_defined_fields: vec![payment.hauler_name.clone(), payment.payment_id.clone()],
            invoices: vec![Invoice {
                invoice_number: payment.invoice_number.clone(),
                invoice_date: invoice_date.to_rfc3339_opts(SecondsFormat::Micros, true),
                total_amount: payment.amount,
            }],
        }
    }
}

/// The issuer's reply: its HTTP status and JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuerResponse {
    pub status: u16,
    pub body: Value,
}

impl IssuerResponse {
    /// The fixed reply used in test mode.
    pub fn test_mode() -> Self {
        Self {
            status: 200,
            body: serde_json::json!({
                "virtual_card": {
                    "number": "4111222233334444",
                    "security_code": "123",
                    "expiration": "2027-09-01T00:00:00Z"
                },
                "detailed_response_message": "Success: Test mode transaction"
            }),
        }
    }

    /// `detailed_response_message`, or `""` when absent.
    pub fn message(&self) -> &str {
        self.body
            .get("detailed_response_message")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// A 2xx status with a message starting with `Success:`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status) && self.message().starts_with(SUCCESS_PREFIX)
    }

    /// The issued card, if the body carries a well-formed one.
    pub fn virtual_card(&self) -> Option<VirtualCard> {
        let card = self.body.get("virtual_card")?;
        serde_json::from_value(card.clone()).ok()
    }

    /// What to report as the error: the message when present, else the
    /// whole body.
    pub fn error_detail(&self) -> Value {
        match self.message() {
            "" => self.body.clone(),
            msg => Value::String(msg.to_owned()),
        }
    }
}
