//! # paymennt-client
//!
//! Async client for the Paymennt merchant checkout API.
//!
//! The client validates requests locally, sends them with the merchant's
//! API key and secret, and unwraps the gateway's `{success, error, result}`
//! envelope into typed results.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use paymennt_client::{ClientConfig, Environment, PaymenntClient};
//! use paymennt_core::{Address, CheckoutRequest, Customer, Item, WebCheckoutRequest};
//!
//! // Create client from environment
//! let client = PaymenntClient::from_env()?;
//!
//! let checkout = CheckoutRequest::new("order-1", "AED", dec!(25.00))
//!     .with_customer(Customer::new("Jane", "Doe", "jane@example.com"))
//!     .with_billing_address(Address::new("Jane Doe", "1 Main St", "Dubai", "AE"))
//!     .with_item(Item::new("Widget", dec!(1), dec!(25.00)));
//!
//! let created = client
//!     .checkout()
//!     .create_checkout(&WebCheckoutRequest::new(checkout, "https://shop.example.com/return"))
//!     .await?;
//!
//! // Redirect the customer to created.redirect_url
//! ```
//!
//! ## Custom HTTP stack
//!
//! Any `HttpTransport` can be injected with `PaymenntClient::with_transport`,
//! which is how tests run without a network.

pub mod checkout;
pub mod client;
pub mod config;
pub mod http;
pub mod transport;

// Re-exports
pub use checkout::CheckoutOperations;
pub use client::PaymenntClient;
pub use config::{ClientConfig, Credentials, Environment};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ApiTransport, RequestOptions, API_KEY_HEADER, API_SECRET_HEADER};
