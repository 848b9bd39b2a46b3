//! # Checkout Types
//!
//! Request payloads sent to the gateway and the `Checkout` it returns.
//! Monetary values are `Decimal` and travel as exact JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh request id (32 hex chars)
pub fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Payment methods accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Crypto,
    Pointcheckout,
    Visa,
    Mastercard,
    Amex,
    Unionpay,
    Tabby,
    CareemPay,
    Mada,
}

/// Order totals breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: Decimal,

    pub tax: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub handling: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    /// Ask the gateway not to cross-check totals against `amount`
    #[serde(default = "default_skip_totals_validation")]
    pub skip_totals_validation: bool,
}

fn default_skip_totals_validation() -> bool {
    true
}

impl Totals {
    pub fn new(subtotal: Decimal, tax: Decimal) -> Self {
        Self {
            subtotal,
            tax,
            shipping: None,
            handling: None,
            discount: None,
            skip_totals_validation: true,
        }
    }
}

impl Default for Totals {
    fn default() -> Self {
        Self::new(Decimal::ZERO, Decimal::ZERO)
    }
}

/// The paying customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Merchant-side customer reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub first_name: String,

    pub last_name: String,

    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Customer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Billing or delivery address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub name: String,

    pub address1: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,

    pub city: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,

    /// ISO 3166 alpha-2 or alpha-3 code
    pub country: String,
}

impl Address {
    pub fn new(
        name: impl Into<String>,
        address1: impl Into<String>,
        city: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address1: address1.into(),
            city: city.into(),
            country: country.into(),
            ..Default::default()
        }
    }
}

/// A line item in the checkout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(rename = "unitprice", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    pub quantity: Decimal,

    /// Required by the gateway; left optional so a missing value is reported
    /// by validation instead of being sent as zero
    #[serde(rename = "linetotal")]
    pub line_total: Option<Decimal>,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: Decimal, line_total: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            line_total: Some(line_total),
            ..Default::default()
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_unit_price(mut self, unit_price: Decimal) -> Self {
        self.unit_price = Some(unit_price);
        self
    }
}

/// Fields shared by every checkout request variant.
///
/// Embedded (flattened) into concrete requests such as [`WebCheckoutRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Unique per request; lets the gateway detect duplicates
    pub request_id: String,

    /// Merchant order reference
    pub order_id: String,

    /// ISO 4217 code
    pub currency: String,

    pub amount: Decimal,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,

    pub items: Vec<Item>,

    pub customer: Customer,

    pub billing_address: Address,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<Address>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_payment_methods: Option<Vec<PaymentMethod>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_payment_method: Option<PaymentMethod>,

    /// Checkout page language (`en`, `ar`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl CheckoutRequest {
    /// Create a request with a generated `request_id`
    pub fn new(order_id: impl Into<String>, currency: impl Into<String>, amount: Decimal) -> Self {
        Self {
            request_id: new_request_id(),
            order_id: order_id.into(),
            currency: currency.into(),
            amount,
            ..Default::default()
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = customer;
        self
    }

    pub fn with_billing_address(mut self, address: Address) -> Self {
        self.billing_address = address;
        self
    }

    pub fn with_delivery_address(mut self, address: Address) -> Self {
        self.delivery_address = Some(address);
        self
    }

    pub fn with_totals(mut self, totals: Totals) -> Self {
        self.totals = Some(totals);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_branch_id(mut self, branch_id: i64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_allowed_payment_methods(mut self, methods: Vec<PaymentMethod>) -> Self {
        self.allowed_payment_methods = Some(methods);
        self
    }

    pub fn with_default_payment_method(mut self, method: PaymentMethod) -> Self {
        self.default_payment_method = Some(method);
        self
    }
}

/// Hosted-page checkout: the customer is redirected to the gateway and
/// comes back to `return_url`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebCheckoutRequest {
    #[serde(flatten)]
    pub checkout: CheckoutRequest,

    pub return_url: String,
}

impl WebCheckoutRequest {
    pub fn new(checkout: CheckoutRequest, return_url: impl Into<String>) -> Self {
        Self {
            checkout,
            return_url: return_url.into(),
        }
    }
}

/// A checkout session as returned by the gateway.
///
/// Only `id` is guaranteed; everything else decodes when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Hosted page the customer should be sent to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}
