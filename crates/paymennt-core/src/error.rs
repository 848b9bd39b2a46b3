//! # Error Types
//!
//! Typed error handling for the Paymennt client.
//! Every operation returns `Result<T, PaymenntError>`.

use std::fmt;
use thiserror::Error;

/// Core error type for all client operations
#[derive(Debug, Error)]
pub enum PaymenntError {
    /// Client construction failed (missing credentials, bad base URL)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request payload broke one or more field constraints.
    /// No network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The payload could not be represented as JSON
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The round trip to the gateway could not be completed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not a well-formed envelope
    #[error("Decode error: {0}")]
    Decode(String),

    /// The gateway answered with an envelope carrying an error
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },
}

impl PaymenntError {
    /// Build an `Api` error without an HTTP status
    pub fn api(message: impl Into<String>) -> Self {
        PaymenntError::Api {
            message: message.into(),
            status: None,
        }
    }

    /// HTTP status carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PaymenntError::Api { status, .. } => *status,
            PaymenntError::Transport(err) => err.status,
            _ => None,
        }
    }

    /// Returns true if the same call may succeed when repeated unchanged
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymenntError::Transport(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Returns true if the caller must fix its input
    pub fn is_validation(&self) -> bool {
        matches!(self, PaymenntError::Validation(_))
    }

    /// Message carried by an `Api` error
    pub fn api_message(&self) -> Option<&str> {
        match self {
            PaymenntError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type PaymenntResult<T> = Result<T, PaymenntError>;

// =============================================================================
// Validation
// =============================================================================

/// A single broken field constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the field, e.g. `customer.email` or `items[0].name`
    pub field: String,
    /// Human-readable constraint message
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint a request broke, in rule order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation names `field` exactly
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// Multi-line report, one `- <field>: <message>` line per violation
    pub fn report(&self) -> String {
        let mut out = String::from("Parameter validation failed:\n");
        for violation in &self.violations {
            out.push_str("- ");
            out.push_str(&violation.to_string());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

// =============================================================================
// Transport
// =============================================================================

/// What went wrong during a round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Connection or DNS failure
    Connect,
    /// The request or the configured deadline timed out
    Timeout,
    /// The caller cancelled the call
    Cancelled,
    /// The request could not be built (bad URI, absent query value)
    InvalidRequest,
    /// The gateway answered non-2xx with a body that is not an envelope
    Status,
    /// Any other I/O failure while sending or reading the body
    Request,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Cancelled => "cancelled",
            TransportErrorKind::InvalidRequest => "invalid request",
            TransportErrorKind::Status => "status",
            TransportErrorKind::Request => "request",
        };
        f.write_str(name)
    }
}

/// Network-level failure with the raw status and body when available
#[derive(Debug, Clone, Error)]
#[error("Transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            body: None,
        }
    }

    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "request cancelled by caller")
    }

    /// Non-2xx response whose body could not be read as an envelope
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Status,
            message: format!("unexpected HTTP status {status}"),
            status: Some(status),
            body: Some(body.into()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self.kind {
            TransportErrorKind::Connect | TransportErrorKind::Timeout => true,
            TransportErrorKind::Status => self.status.is_some_and(|s| s >= 500 || s == 429),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        let refused = TransportError::new(TransportErrorKind::Connect, "refused");
        assert!(PaymenntError::from(refused).is_retryable());
        assert!(PaymenntError::from(TransportError::status(503, "busy")).is_retryable());
        assert!(!PaymenntError::from(TransportError::status(400, "bad")).is_retryable());
        assert!(!PaymenntError::from(TransportError::cancelled()).is_retryable());
        assert!(!PaymenntError::api("insufficient_funds").is_retryable());
    }

    #[test]
    fn test_status_codes() {
        let err = PaymenntError::Api {
            message: "not_found".into(),
            status: Some(404),
        };
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(PaymenntError::from(TransportError::status(502, "")).status_code(), Some(502));
        assert_eq!(PaymenntError::Decode("bad".into()).status_code(), None);
    }

    #[test]
    fn test_validation_report_lists_every_violation() {
        let err = ValidationError::new(vec![
            Violation::new("requestId", "must not be blank"),
            Violation::new("customer.email", "must not be blank"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: requestId: must not be blank; customer.email: must not be blank"
        );
        assert_eq!(
            err.report(),
            "Parameter validation failed:\n- requestId: must not be blank\n- customer.email: must not be blank\n"
        );
        assert!(err.has_field("customer.email"));
        assert!(!err.has_field("customer"));
    }

    #[test]
    fn test_api_message() {
        let err = PaymenntError::api("not_found");
        assert_eq!(err.api_message(), Some("not_found"));
        assert_eq!(err.to_string(), "API error: not_found");
    }
}
