//! # paymennt-core
//!
//! Core types for the Paymennt checkout API client.
//!
//! This crate provides:
//! - `WebCheckoutRequest` and its nested records for the checkout payload
//! - `Validate` with declarative rule tables that report every violation
//! - `JsonCodec` and `Envelope` for the uniform `{success, error, result}` wrapper
//! - `PaymenntError` for typed error handling
//!
//! It performs no I/O; `paymennt-client` supplies the transport.
//!
//! ## Example
//!
//! ```rust,ignore
//! use paymennt_core::{Address, CheckoutRequest, Customer, Item, Validate, WebCheckoutRequest};
//!
//! let checkout = CheckoutRequest::new("order-1", "USD", dec!(10.00))
//!     .with_customer(Customer::new("Jane", "Doe", "jane@example.com"))
//!     .with_billing_address(Address::new("Jane Doe", "1 Main St", "Dubai", "AE"))
//!     .with_item(Item::new("Widget", dec!(1), dec!(10.00)));
//!
//! let request = WebCheckoutRequest::new(checkout, "https://shop.example.com/return");
//! request.validate()?;
//! ```

pub mod checkout;
pub mod codec;
pub mod error;
pub mod validate;

// Re-exports for convenience
pub use checkout::{
    new_request_id, Address, Checkout, CheckoutRequest, Customer, Item, PaymentMethod, Totals,
    WebCheckoutRequest,
};
pub use codec::{Envelope, JsonCodec};
pub use error::{
    PaymenntError, PaymenntResult, TransportError, TransportErrorKind, ValidationError, Violation,
};
pub use rust_decimal::Decimal;
pub use validate::{Constraint, Validate};
