//! # Checkout Operations
//!
//! Create and fetch hosted checkouts. Each call validates its input,
//! performs exactly one round trip and unwraps the response envelope:
//!
//! ```text
//! Built ──▶ Validated ──▶ Sent ──▶ Decoded ──▶ Success
//!              │            │          │
//!              ▼            ▼          ▼
//!          Validation   Transport   Decode / Api
//! ```

use crate::http::{HttpMethod, HttpResponse};
use crate::transport::{ApiTransport, RequestOptions};
use paymennt_core::{
    Checkout, JsonCodec, PaymenntError, PaymenntResult, TransportError, Validate, ValidationError,
    Violation, WebCheckoutRequest,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument};

const CHECKOUT: &str = "checkout";
const WEB: &str = "web";

/// Checkout endpoints, borrowing the client's transport and codec
#[derive(Debug, Clone, Copy)]
pub struct CheckoutOperations<'a> {
    transport: &'a ApiTransport,
    codec: &'a JsonCodec,
}

impl<'a> CheckoutOperations<'a> {
    pub fn new(transport: &'a ApiTransport, codec: &'a JsonCodec) -> Self {
        Self { transport, codec }
    }

    /// Create a hosted (web) checkout.
    ///
    /// Fails with `Validation` before any network call if the request
    /// breaks a field constraint.
    pub async fn create_checkout(&self, request: &WebCheckoutRequest) -> PaymenntResult<Checkout> {
        self.create_checkout_with_options(request, &RequestOptions::default())
            .await
    }

    #[instrument(
        skip(self, request, options),
        fields(request_id = %request.checkout.request_id, order_id = %request.checkout.order_id)
    )]
    pub async fn create_checkout_with_options(
        &self,
        request: &WebCheckoutRequest,
        options: &RequestOptions,
    ) -> PaymenntResult<Checkout> {
        if let Err(err) = request.validate() {
            debug!(violations = err.violations().len(), "Checkout request rejected locally");
            return Err(err.into());
        }

        let body = self.codec.encode(request)?;
        debug!(
            "Creating web checkout: {} items, amount={} {}",
            request.checkout.items.len(),
            request.checkout.amount,
            request.checkout.currency
        );

        let response = self
            .transport
            .send(HttpMethod::Post, &[CHECKOUT, WEB], &[], Some(body), options)
            .await?;

        let checkout: Checkout = decode_response(self.codec, response)?;
        info!(checkout_id = %checkout.id, "Created web checkout");
        Ok(checkout)
    }

    /// Fetch a checkout by id
    pub async fn get_checkout(&self, checkout_id: &str) -> PaymenntResult<Checkout> {
        self.get_checkout_with_options(checkout_id, &RequestOptions::default())
            .await
    }

    #[instrument(skip(self, options))]
    pub async fn get_checkout_with_options(
        &self,
        checkout_id: &str,
        options: &RequestOptions,
    ) -> PaymenntResult<Checkout> {
        if let Some(message) = checkout_id_violation(checkout_id) {
            return Err(ValidationError::new(vec![Violation::new("checkoutId", message)]).into());
        }

        let response = self
            .transport
            .send(HttpMethod::Get, &[CHECKOUT, checkout_id], &[], None, options)
            .await?;

        let checkout: Checkout = decode_response(self.codec, response)?;
        debug!(status = ?checkout.status, "Fetched checkout");
        Ok(checkout)
    }
}

/// An id must fill exactly one path segment
fn checkout_id_violation(checkout_id: &str) -> Option<&'static str> {
    if checkout_id.trim().is_empty() {
        Some("must not be blank")
    } else if checkout_id == "." || checkout_id == ".." {
        Some("must not be a relative path segment")
    } else {
        None
    }
}

/// Classify a raw response and unwrap its envelope.
///
/// - 2xx: decode the envelope (`Decode` / `Api` on failure)
/// - non-2xx with an enveloped error: `Api` carrying the status
/// - non-2xx otherwise: `Transport` with the raw status and body
pub(crate) fn decode_response<T: DeserializeOwned>(
    codec: &JsonCodec,
    response: HttpResponse,
) -> PaymenntResult<T> {
    if response.is_success() {
        return codec.decode(&response.body).map_err(|err| {
            if let PaymenntError::Api { message, .. } = &err {
                error!(status = response.status, "Request failed with error: {}", message);
            }
            err
        });
    }

    match codec.decode_envelope::<serde_json::Value>(&response.body) {
        Ok(envelope) => match envelope.error_message() {
            Some(message) => {
                error!(status = response.status, "Request failed with error: {}", message);
                Err(PaymenntError::Api {
                    message: message.to_string(),
                    status: Some(response.status),
                })
            }
            None => Err(status_error(response)),
        },
        Err(_) => Err(status_error(response)),
    }
}

fn status_error(response: HttpResponse) -> PaymenntError {
    error!(
        "Paymennt API error: status={}, body={}",
        response.status, response.body
    );
    TransportError::status(response.status, response.body).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paymennt_core::TransportErrorKind;

    fn codec() -> JsonCodec {
        JsonCodec::new()
    }

    #[test]
    fn test_success_decodes_result() {
        let checkout: Checkout = decode_response(
            &codec(),
            HttpResponse::new(200, r#"{"success":true,"result":{"id":"chk_1"}}"#),
        )
        .unwrap();
        assert_eq!(checkout.id, "chk_1");
    }

    #[test]
    fn test_ok_status_with_error_is_api_error() {
        let err = decode_response::<Checkout>(
            &codec(),
            HttpResponse::new(200, r#"{"success":false,"error":"not_found"}"#),
        )
        .unwrap_err();
        assert_eq!(err.api_message(), Some("not_found"));
    }

    #[test]
    fn test_error_status_with_envelope_is_api_error() {
        let err = decode_response::<Checkout>(
            &codec(),
            HttpResponse::new(400, r#"{"success":false,"error":"Invalid currency"}"#),
        )
        .unwrap_err();
        assert_eq!(err.api_message(), Some("Invalid currency"));
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn test_error_status_without_envelope_is_transport_error() {
        let response = HttpResponse::new(502, "<html>Bad Gateway</html>");
        let err = decode_response::<Checkout>(&codec(), response).unwrap_err();
        match err {
            PaymenntError::Transport(e) => {
                assert_eq!(e.kind, TransportErrorKind::Status);
                assert_eq!(e.status, Some(502));
                assert_eq!(e.body.as_deref(), Some("<html>Bad Gateway</html>"));
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[test]
    fn test_ok_status_error_with_mismatched_result_is_api_error() {
        for body in [
            r#"{"success":false,"error":"not_found","result":{}}"#,
            r#"{"success":false,"error":"not_found","result":"n/a"}"#,
        ] {
            let response = HttpResponse::new(200, body);
            let err = decode_response::<Checkout>(&codec(), response).unwrap_err();
            assert_eq!(err.api_message(), Some("not_found"), "{body}");
        }
    }

    #[test]
    fn test_checkout_id_must_be_one_segment() {
        assert_eq!(checkout_id_violation(" "), Some("must not be blank"));
        assert_eq!(checkout_id_violation("."), Some("must not be a relative path segment"));
        assert_eq!(checkout_id_violation(".."), Some("must not be a relative path segment"));
        assert_eq!(checkout_id_violation("..."), None);
        assert_eq!(checkout_id_violation("chk_1"), None);
    }

    #[test]
    fn test_ok_status_with_garbage_is_decode_error() {
        let response = HttpResponse::new(200, "not json");
        let err = decode_response::<Checkout>(&codec(), response).unwrap_err();
        assert!(matches!(err, PaymenntError::Decode(_)));
    }
}
