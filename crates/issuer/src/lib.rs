//! Client for the virtual-card issuing API.
//!
//! Builds the issue request from a [`PaymentRequest`](cardrelay_core::PaymentRequest),
//! posts it with HTTP Basic credentials, and interprets the reply. In test
//! mode no network call is made and a fixed successful card is returned.
//!
//! ```rust,no_run
//! use cardrelay_issuer::{IssuerClient, IssuerConfig};
//!
//! let config = IssuerConfig::new("https://issuer.example.com/cards")
//!     .with_credentials("user", "pass")
//!     .with_merchant_code("M-01");
//! let client = IssuerClient::new(config).expect("client builds");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::IssuerClient;
pub use config::IssuerConfig;
pub use error::IssuerError;
pub use types::{CardIssueRequest, Invoice, IssuerResponse};
