//! # Request Validation
//!
//! Field constraints are declared as static rule tables, one per request
//! type: a field path, an accessor, and the constraints that apply. The
//! validator walks every table and every nested record, collecting all
//! violations instead of stopping at the first.
//!
//! ```text
//! WebCheckoutRequest
//!   ├── CHECKOUT_RULES      requestId, orderId, currency, amount, ...
//!   ├── totals.*            TOTALS_RULES
//!   ├── customer.*          CUSTOMER_RULES
//!   ├── billingAddress.*    ADDRESS_RULES
//!   ├── deliveryAddress.*   ADDRESS_RULES (when present)
//!   ├── items[i].*          ITEM_RULES
//!   └── WEB_RULES           returnUrl
//! ```

use crate::checkout::{Address, CheckoutRequest, Customer, Item, Totals, WebCheckoutRequest};
use crate::error::{ValidationError, Violation};
use rust_decimal::Decimal;

/// A single field constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Value must be present
    Required,
    /// Text must be present and non-empty after trimming
    NotBlank,
    /// Text length (in chars) within `min..=max`, when present
    Length { min: usize, max: usize },
    /// Decimal strictly greater than zero, when present
    Positive,
    /// Decimal greater than or equal to zero, when present
    NonNegative,
    /// Collection must be present and non-empty
    NotEmpty,
}

/// A field value as seen by the rule table
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(Option<&'a str>),
    Number(Option<&'a Decimal>),
    Count(Option<usize>),
}

impl Constraint {
    /// Check `value`, returning the violation message on failure
    pub fn check(&self, value: FieldValue<'_>) -> Option<String> {
        match (*self, value) {
            (Constraint::Required, FieldValue::Text(None))
            | (Constraint::Required, FieldValue::Number(None))
            | (Constraint::Required, FieldValue::Count(None)) => {
                Some("must not be null".to_string())
            }

            (Constraint::NotBlank, FieldValue::Text(text)) => match text {
                Some(s) if !s.trim().is_empty() => None,
                _ => Some("must not be blank".to_string()),
            },

            (Constraint::Length { min, max }, FieldValue::Text(Some(s))) => {
                let len = s.chars().count();
                if len >= min && len <= max {
                    None
                } else if min == max {
                    Some(format!("length must be {min}"))
                } else if min == 0 {
                    Some(format!("length must be at most {max}"))
                } else {
                    Some(format!("length must be between {min} and {max}"))
                }
            }

            (Constraint::Positive, FieldValue::Number(Some(n))) if *n <= Decimal::ZERO => {
                Some("must be greater than 0".to_string())
            }

            (Constraint::NonNegative, FieldValue::Number(Some(n))) if *n < Decimal::ZERO => {
                Some("must be greater than or equal to 0".to_string())
            }

            (Constraint::NotEmpty, FieldValue::Count(count)) => match count {
                Some(n) if n > 0 => None,
                _ => Some("must not be empty".to_string()),
            },

            _ => None,
        }
    }
}

const fn max_len(max: usize) -> Constraint {
    Constraint::Length { min: 0, max }
}

/// One row of a rule table
pub struct FieldRule<T> {
    pub field: &'static str,
    pub read: for<'a> fn(&'a T) -> FieldValue<'a>,
    pub constraints: &'static [Constraint],
}

fn text(s: &str) -> FieldValue<'_> {
    FieldValue::Text(Some(s))
}

fn opt_text(s: &Option<String>) -> FieldValue<'_> {
    FieldValue::Text(s.as_deref())
}

// =============================================================================
// Rule tables
// =============================================================================

pub static CHECKOUT_RULES: &[FieldRule<CheckoutRequest>] = &[
    FieldRule {
        field: "requestId",
        read: |r| text(&r.request_id),
        constraints: &[Constraint::NotBlank, Constraint::Length { min: 1, max: 50 }],
    },
    FieldRule {
        field: "orderId",
        read: |r| text(&r.order_id),
        constraints: &[Constraint::NotBlank, Constraint::Length { min: 1, max: 50 }],
    },
    FieldRule {
        field: "currency",
        read: |r| text(&r.currency),
        constraints: &[Constraint::NotBlank, Constraint::Length { min: 3, max: 3 }],
    },
    FieldRule {
        field: "amount",
        read: |r| FieldValue::Number(Some(&r.amount)),
        constraints: &[Constraint::Required, Constraint::Positive],
    },
    FieldRule {
        field: "language",
        read: |r| opt_text(&r.language),
        constraints: &[Constraint::Length { min: 2, max: 3 }],
    },
    FieldRule {
        field: "items",
        read: |r| FieldValue::Count(Some(r.items.len())),
        constraints: &[Constraint::NotEmpty],
    },
];

pub static TOTALS_RULES: &[FieldRule<Totals>] = &[
    FieldRule {
        field: "subtotal",
        read: |t| FieldValue::Number(Some(&t.subtotal)),
        constraints: &[Constraint::Required, Constraint::NonNegative],
    },
    FieldRule {
        field: "tax",
        read: |t| FieldValue::Number(Some(&t.tax)),
        constraints: &[Constraint::Required, Constraint::NonNegative],
    },
    FieldRule {
        field: "shipping",
        read: |t| FieldValue::Number(t.shipping.as_ref()),
        constraints: &[Constraint::NonNegative],
    },
    FieldRule {
        field: "handling",
        read: |t| FieldValue::Number(t.handling.as_ref()),
        constraints: &[Constraint::NonNegative],
    },
    FieldRule {
        field: "discount",
        read: |t| FieldValue::Number(t.discount.as_ref()),
        constraints: &[Constraint::NonNegative],
    },
];

pub static CUSTOMER_RULES: &[FieldRule<Customer>] = &[
    FieldRule {
        field: "id",
        read: |c| opt_text(&c.id),
        constraints: &[max_len(50)],
    },
    FieldRule {
        field: "firstName",
        read: |c| text(&c.first_name),
        constraints: &[Constraint::NotBlank, max_len(60)],
    },
    FieldRule {
        field: "lastName",
        read: |c| text(&c.last_name),
        constraints: &[Constraint::NotBlank, max_len(40)],
    },
    FieldRule {
        field: "email",
        read: |c| text(&c.email),
        constraints: &[Constraint::NotBlank, max_len(50)],
    },
    FieldRule {
        field: "phone",
        read: |c| opt_text(&c.phone),
        constraints: &[max_len(20)],
    },
];

pub static ADDRESS_RULES: &[FieldRule<Address>] = &[
    FieldRule {
        field: "name",
        read: |a| text(&a.name),
        constraints: &[Constraint::NotBlank, max_len(100)],
    },
    FieldRule {
        field: "address1",
        read: |a| text(&a.address1),
        constraints: &[Constraint::NotBlank, max_len(255)],
    },
    FieldRule {
        field: "address2",
        read: |a| opt_text(&a.address2),
        constraints: &[max_len(255)],
    },
    FieldRule {
        field: "city",
        read: |a| text(&a.city),
        constraints: &[Constraint::NotBlank, max_len(50)],
    },
    FieldRule {
        field: "state",
        read: |a| opt_text(&a.state),
        constraints: &[max_len(50)],
    },
    FieldRule {
        field: "zip",
        read: |a| opt_text(&a.zip),
        constraints: &[max_len(20)],
    },
    FieldRule {
        field: "country",
        read: |a| text(&a.country),
        constraints: &[Constraint::NotBlank, Constraint::Length { min: 2, max: 3 }],
    },
];

pub static ITEM_RULES: &[FieldRule<Item>] = &[
    FieldRule {
        field: "name",
        read: |i| text(&i.name),
        constraints: &[Constraint::NotBlank, max_len(500)],
    },
    FieldRule {
        field: "sku",
        read: |i| opt_text(&i.sku),
        constraints: &[max_len(200)],
    },
    FieldRule {
        field: "quantity",
        read: |i| FieldValue::Number(Some(&i.quantity)),
        constraints: &[Constraint::Required, Constraint::Positive],
    },
    FieldRule {
        field: "linetotal",
        read: |i| FieldValue::Number(i.line_total.as_ref()),
        constraints: &[Constraint::Required],
    },
];

pub static WEB_RULES: &[FieldRule<WebCheckoutRequest>] = &[FieldRule {
    field: "returnUrl",
    read: |w| text(&w.return_url),
    constraints: &[Constraint::NotBlank],
}];

// =============================================================================
// Validator
// =============================================================================

/// Accumulates violations while walking nested records
#[derive(Debug, Default)]
pub struct Violations {
    prefix: String,
    collected: Vec<Violation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", self.prefix, field)
        }
    }

    /// Evaluate every rule of `table` against `value`
    pub fn apply<T>(&mut self, table: &[FieldRule<T>], value: &T) {
        for rule in table {
            let field_value = (rule.read)(value);
            for constraint in rule.constraints {
                if let Some(message) = constraint.check(field_value) {
                    let path = self.path(rule.field);
                    self.collected.push(Violation::new(path, message));
                }
            }
        }
    }

    /// Validate `value` with `segment` appended to the current path
    pub fn nested<V: Validate + ?Sized>(&mut self, segment: &str, value: &V) {
        let saved = std::mem::take(&mut self.prefix);
        self.prefix = if saved.is_empty() {
            segment.to_string()
        } else {
            format!("{saved}.{segment}")
        };
        value.collect_violations(self);
        self.prefix = saved;
    }

    pub fn is_empty(&self) -> bool {
        self.collected.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.collected.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.collected))
        }
    }
}

/// Types that can be checked against their rule table before sending
pub trait Validate {
    /// Push every violation of `self` (and nested records) into `out`
    fn collect_violations(&self, out: &mut Violations);

    /// Validate and return every violation found
    fn validate(&self) -> Result<(), ValidationError> {
        let mut out = Violations::new();
        self.collect_violations(&mut out);
        out.into_result()
    }
}

impl Validate for Totals {
    fn collect_violations(&self, out: &mut Violations) {
        out.apply(TOTALS_RULES, self);
    }
}

impl Validate for Customer {
    fn collect_violations(&self, out: &mut Violations) {
        out.apply(CUSTOMER_RULES, self);
    }
}

impl Validate for Address {
    fn collect_violations(&self, out: &mut Violations) {
        out.apply(ADDRESS_RULES, self);
    }
}

impl Validate for Item {
    fn collect_violations(&self, out: &mut Violations) {
        out.apply(ITEM_RULES, self);
    }
}

impl Validate for CheckoutRequest {
    fn collect_violations(&self, out: &mut Violations) {
        out.apply(CHECKOUT_RULES, self);
        if let Some(totals) = &self.totals {
            out.nested("totals", totals);
        }
        out.nested("customer", &self.customer);
        out.nested("billingAddress", &self.billing_address);
        if let Some(delivery) = &self.delivery_address {
            out.nested("deliveryAddress", delivery);
        }
        for (i, item) in self.items.iter().enumerate() {
            out.nested(&format!("items[{i}]"), item);
        }
    }
}

impl Validate for WebCheckoutRequest {
    fn collect_violations(&self, out: &mut Violations) {
        self.checkout.collect_violations(out);
        out.apply(WEB_RULES, self);
    }
}
