//! # Create Checkout
//!
//! Creates a hosted checkout, then fetches it back.
//!
//! ## Usage
//!
//! ```bash
//! export PAYMENNT_API_KEY=...
//! export PAYMENNT_API_SECRET=...
//! export PAYMENNT_ENVIRONMENT=test
//!
//! cargo run -p paymennt-client --example create_checkout
//! ```

use paymennt_client::PaymenntClient;
use paymennt_core::{
    new_request_id, Address, CheckoutRequest, Customer, Decimal, Item, PaymentMethod, PaymenntError,
    Totals, WebCheckoutRequest,
};
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let client = PaymenntClient::from_env()?;
    info!("Environment: {}", client.environment());

    let price = Decimal::from_str("49.50")?;
    let checkout = CheckoutRequest::new(format!("order-{}", &new_request_id()[..8]), "AED", price)
        .with_customer(Customer::new("Jane", "Doe", "jane@example.com").with_phone("+971500000000"))
        .with_billing_address(Address::new("Jane Doe", "1 Sheikh Zayed Rd", "Dubai", "AE"))
        .with_totals(Totals::new(price, Decimal::ZERO))
        .with_item(
            Item::new("Rust Handbook", Decimal::ONE, price)
                .with_sku("BOOK-RUST-01")
                .with_unit_price(price),
        )
        .with_allowed_payment_methods(vec![PaymentMethod::Card, PaymentMethod::Tabby])
        .with_language("en");

    let request = WebCheckoutRequest::new(checkout, "https://shop.example.com/return");
    info!("Payload:\n{}", client.codec().encode_pretty(&request)?);

    let created = match client.checkout().create_checkout(&request).await {
        Ok(checkout) => checkout,
        Err(PaymenntError::Validation(err)) => {
            warn!("{}", err.report());
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        "Created checkout {} -> {}",
        created.id,
        created.redirect_url.as_deref().unwrap_or("<no redirect>")
    );

    let fetched = client.checkout().get_checkout(&created.id).await?;
    info!("Checkout {} status: {:?}", fetched.id, fetched.status);

    Ok(())
}
