use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use cardrelay_core::PaymentRequest;

use crate::config::IssuerConfig;
use crate::error::IssuerError;
use crate::types::{CardIssueRequest, IssuerResponse};

/// Issues virtual cards through the issuer's HTTP API.
pub struct IssuerClient {
    config: IssuerConfig,
    client: Client,
}

impl IssuerClient {
    /// Create a client from `config`.
    ///
    /// Outside test mode the issuer URL must be set.
    pub fn new(config: IssuerConfig) -> Result<Self, IssuerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Self::with_client(config, client)
    }

    /// Create a client sharing an existing HTTP client.
    pub fn with_client(config: IssuerConfig, client: Client) -> Result<Self, IssuerError> {
        if !config.test_mode && config.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(IssuerError::Configuration(
                "issuer url is required unless test mode is enabled".into(),
            ));
        }
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &IssuerConfig {
        &self.config
    }

    pub fn is_test_mode(&self) -> bool {
        self.config.test_mode
    }

    /// Request a virtual card for `payment`.
    ///
    /// Any HTTP reply with a JSON body is returned as an [`IssuerResponse`],
    /// whatever its status; callers decide success with
    /// [`IssuerResponse::is_success`]. Transport errors and non-JSON bodies
    /// are errors.
    #[instrument(skip(self, payment), fields(payment_id = %payment.payment_id))]
    pub async fn issue(&self, payment: &PaymentRequest) -> Result<IssuerResponse, IssuerError> {
        let request = CardIssueRequest::new(self.config.merchant_code.as_str(), payment);
        debug!(
            total_amount = request.total_amount,
            invoice_number = %payment.invoice_number,
            "built card issue request"
        );

        if self.config.test_mode {
            info!("test mode enabled, simulating issuer response");
            return Ok(IssuerResponse::test_mode());
        }

        let url = self.config.url.as_deref().ok_or_else(|| {
            IssuerError::Configuration("issuer url is not set".into())
        })?;

        info!("calling issuer");
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).map_err(|e| {
            warn!(status, error = %e, "issuer response is not JSON");
            IssuerError::InvalidResponse(e.to_string())
        })?;

        debug!(status, "received issuer response");
        Ok(IssuerResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    /// Accepts one connection, answers with a canned response, and returns the
    /// raw request.
    struct MockIssuer {
        listener: tokio::net::TcpListener,
        url: String,
    }

    impl MockIssuer {
        async fn start() -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind mock issuer");
            let port = listener.local_addr().unwrap().port();
            Self {
                listener,
                url: format!("http://127.0.0.1:{port}/cards"),
            }
        }

        async fn respond_once(self, status_code: u16, body: &str) -> String {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};

            let body = body.to_owned();
            let (mut stream, _) = self.listener.accept().await.unwrap();

            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                if request_complete(&buf) {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {status_code} OK\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\
                 \r\n\
                 {body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();

            String::from_utf8_lossy(&buf).into_owned()
        }
    }

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        buf.len() >= header_end + 4 + content_length
    }

    fn payment() -> PaymentRequest {
        PaymentRequest::from_json(&json!({
            "_id": 1,
            "x_name": "PAY-1",
            "x_studio_vendor_name": "Acme Hauling",
            "x_studio_vendor_payment_amount_requested": 40,
            "x_studio_hauler_invoice_or_remittance_advice_memo": "INV-1"
        }))
        .unwrap()
    }

    #[test]
    fn url_required_outside_test_mode() {
        let mut config = IssuerConfig::new("");
        assert!(matches!(
            IssuerClient::new(config.clone()),
            Err(IssuerError::Configuration(_))
        ));

        config.url = None;
        assert!(IssuerClient::new(config.clone()).is_err());
        assert!(IssuerClient::new(config.with_test_mode(true)).is_ok());
    }

    #[tokio::test]
    async fn test_mode_never_calls_out() {
        let client = IssuerClient::new(IssuerConfig::test_mode()).unwrap();
        let response = client.issue(&payment()).await.unwrap();
        assert_eq!(response, IssuerResponse::test_mode());
    }

    #[tokio::test]
    async fn posts_request_with_basic_auth() {
        let issuer = MockIssuer::start().await;
        let config = IssuerConfig::new(&issuer.url)
            .with_credentials("user", "pass")
            .with_merchant_code("M-01");
        let client = IssuerClient::new(config).unwrap();

        let reply = r#"{"virtual_card":{"number":"5555","security_code":"999","expiration":"2028-01-01T00:00:00Z"},"detailed_response_message":"Success: issued"}"#;
        let handle = tokio::spawn(async move { issuer.respond_once(200, reply).await });

        let response = client.issue(&payment()).await.unwrap();
        let request = handle.await.unwrap();
        let lower = request.to_lowercase();

        assert!(request.starts_with("POST /cards "));
        assert!(lower.contains("authorization: basic dxnlcjpwyxnz"));
        assert!(lower.contains("content-type: application/json"));
        assert!(request.contains(r#""merchant_code":"M-01""#));
        assert!(request.contains(r#""user_defined_fields":["Acme Hauling","PAY-1"]"#));

        assert!(response.is_success());
        assert_eq!(response.virtual_card().unwrap().number.as_deref(), Some("5555"));
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let issuer = MockIssuer::start().await;
        let client = IssuerClient::new(IssuerConfig::new(&issuer.url)).unwrap();

        let handle = tokio::spawn(async move {
            issuer
                .respond_once(422, r#"{"detailed_response_message":"Declined"}"#)
                .await
        });
        let response = client.issue(&payment()).await.unwrap();
        handle.await.unwrap();

        assert_eq!(response.status, 422);
        assert!(!response.is_success());
        assert_eq!(response.message(), "Declined");
    }

    #[tokio::test]
    async fn non_json_body_is_an_error() {
        let issuer = MockIssuer::start().await;
        let client = IssuerClient::new(IssuerConfig::new(&issuer.url)).unwrap();

        let handle = tokio::spawn(async move { issuer.respond_once(200, "<html>").await });
        let err = client.issue(&payment()).await.unwrap_err();
        handle.await.unwrap();

        assert!(matches!(err, IssuerError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_issuer_is_an_http_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = IssuerConfig::new(format!("http://127.0.0.1:{port}/cards"))
            .with_timeout(Duration::from_secs(2));
        let client = IssuerClient::new(config).unwrap();
        let err = client.issue(&payment()).await.unwrap_err();
        assert!(matches!(err, IssuerError::Http(_)));
    }
}
