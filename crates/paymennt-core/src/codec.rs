//! # Envelope Codec
//!
//! Every gateway response is wrapped in the same envelope:
//!
//! ```json
//! { "success": true, "elapsed": 12, "error": null, "result": { ... } }
//! ```
//!
//! `JsonCodec` encodes request payloads and unwraps envelopes into typed
//! results. It holds no mutable state, so one instance can be shared by
//! any number of concurrent calls.

use crate::error::{PaymenntError, PaymenntResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Wire-level response wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,

    /// Server-side processing time in milliseconds
    #[serde(rename = "elapsed", default, deserialize_with = "lenient_millis")]
    pub elapsed_ms: u64,

    pub error: Option<String>,

    pub result: Option<T>,
}

impl<T> Envelope<T> {
    /// Successful envelope around `result`
    pub fn ok(result: T) -> Self {
        Self {
            success: true,
            elapsed_ms: 0,
            error: None,
            result: Some(result),
        }
    }

    /// Failed envelope carrying `error`
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed_ms: 0,
            error: Some(error.into()),
            result: None,
        }
    }

    /// The carried error, if it is non-empty
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// Unwrap into the result, turning a carried error into `Api`
    pub fn into_result(self) -> PaymenntResult<T> {
        if let Some(message) = self.error_message() {
            return Err(PaymenntError::api(message));
        }
        self.result.ok_or_else(|| {
            PaymenntError::Decode("envelope has neither result nor error".to_string())
        })
    }
}

/// Informational only: fractions are truncated, anything that is not a
/// non-negative number reads as zero.
fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let millis = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
            .unwrap_or(0),
        _ => 0,
    };
    Ok(millis)
}

/// JSON encoder/decoder for gateway payloads
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec {
    _private: (),
}

impl JsonCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact JSON
    pub fn encode<P: Serialize + ?Sized>(&self, payload: &P) -> PaymenntResult<String> {
        serde_json::to_string(payload).map_err(|e| PaymenntError::Encoding(e.to_string()))
    }

    /// Indented JSON, for logs and debugging
    pub fn encode_pretty<P: Serialize + ?Sized>(&self, payload: &P) -> PaymenntResult<String> {
        serde_json::to_string_pretty(payload).map_err(|e| PaymenntError::Encoding(e.to_string()))
    }

    /// Probe whether `payload` can be encoded, without raising
    pub fn can_encode<P: Serialize + ?Sized>(&self, payload: &P) -> bool {
        serde_json::to_value(payload).is_ok()
    }

    /// Parse `body` as an envelope without unwrapping it
    pub fn decode_envelope<T: DeserializeOwned>(&self, body: &str) -> PaymenntResult<Envelope<T>> {
        serde_json::from_str(body)
            .map_err(|e| PaymenntError::Decode(format!("failed to parse response envelope: {e}")))
    }

    /// Parse `body` as an envelope and return its result.
    ///
    /// A non-empty `error` wins over any `result` that came with it, whatever
    /// shape that result has. The result is only bound to `T` afterwards.
    pub fn decode<T: DeserializeOwned>(&self, body: &str) -> PaymenntResult<T> {
        let result = self.decode_envelope::<Value>(body)?.into_result()?;
        serde_json::from_value(result)
            .map_err(|e| PaymenntError::Decode(format!("failed to parse response result: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::Checkout;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Quote {
        amount: Decimal,
        #[serde(rename = "linetotal")]
        line_total: Decimal,
    }

    fn codec() -> JsonCodec {
        JsonCodec::new()
    }

    #[test]
    fn test_decode_success() {
        let checkout: Checkout = codec()
            .decode(r#"{"success":true,"elapsed":4,"error":null,"result":{"id":"chk_1"}}"#)
            .unwrap();
        assert_eq!(checkout.id, "chk_1");
    }

    #[test]
    fn test_error_discards_result() {
        let err = codec()
            .decode::<Checkout>(
                r#"{"success":false,"error":"insufficient_funds","result":{"id":"chk_1"}}"#,
            )
            .unwrap_err();
        assert_eq!(err.api_message(), Some("insufficient_funds"));
    }

    #[test]
    fn test_error_wins_over_mismatched_result() {
        for body in [
            r#"{"success":false,"error":"not_found","result":{}}"#,
            r#"{"success":false,"error":"not_found","result":"n/a"}"#,
            r#"{"success":false,"error":"not_found","result":{"status":"OPEN"}}"#,
        ] {
            let err = codec().decode::<Checkout>(body).unwrap_err();
            assert_eq!(err.api_message(), Some("not_found"), "{body}");
        }
    }

    #[test]
    fn test_elapsed_is_lenient() {
        for elapsed in ["1.5", "-3", "\"12\"", "null"] {
            let body = format!(r#"{{"success":true,"elapsed":{elapsed},"result":{{"id":"x"}}}}"#);
            let checkout: Checkout = codec().decode(&body).unwrap();
            assert_eq!(checkout.id, "x");
        }

        let envelope: Envelope<Value> = codec()
            .decode_envelope(r#"{"success":true,"elapsed":7.9,"result":null}"#)
            .unwrap();
        assert_eq!(envelope.elapsed_ms, 7);
    }

    #[test]
    fn test_unknown_top_level_field_is_ignored() {
        let checkout: Checkout = codec()
            .decode(r#"{"success":true,"extra":123,"result":{"id":"chk_1","unknown":[1,2]}}"#)
            .unwrap();
        assert_eq!(checkout.id, "chk_1");
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let checkout: Checkout = codec()
            .decode(r#"{"success":true,"error":"","result":{"id":"chk_1"}}"#)
            .unwrap();
        assert_eq!(checkout.id, "chk_1");
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = codec().decode::<Checkout>("<html>502</html>").unwrap_err();
        assert!(matches!(err, PaymenntError::Decode(_)));
    }

    #[test]
    fn test_shape_mismatch_is_decode_error() {
        let err = codec()
            .decode::<Checkout>(r#"{"success":true,"result":{"noId":true}}"#)
            .unwrap_err();
        assert!(matches!(err, PaymenntError::Decode(_)));

        let err = codec().decode::<Checkout>(r#"[1,2,3]"#).unwrap_err();
        assert!(matches!(err, PaymenntError::Decode(_)));
    }

    #[test]
    fn test_missing_result_is_decode_error() {
        let err = codec().decode::<Checkout>(r#"{"success":true}"#).unwrap_err();
        assert!(matches!(err, PaymenntError::Decode(_)));
    }

    #[test]
    fn test_decimal_precision_survives_envelope() {
        let quote = Quote {
            amount: Decimal::from_str("19.990000000000001").unwrap(),
            line_total: Decimal::from_str("0.10").unwrap(),
        };
        let body = codec().encode(&Envelope::ok(&quote)).unwrap();
        assert!(body.contains("19.990000000000001"), "{body}");

        let decoded: Quote = codec().decode(&body).unwrap();
        assert_eq!(decoded, quote);
        assert_eq!(decoded.amount.to_string(), "19.990000000000001");
        assert_eq!(decoded.line_total.to_string(), "0.10");
    }

    #[test]
    fn test_encode_pretty_leaves_encode_compact() {
        let pretty = codec().encode_pretty(&Envelope::ok("x")).unwrap();
        assert!(pretty.contains('\n'));
        let compact = codec().encode(&Envelope::ok("x")).unwrap();
        assert!(!compact.contains('\n'));
    }

    #[test]
    fn test_can_encode() {
        let mut map = std::collections::HashMap::new();
        map.insert(vec![1u8], "non-string key");
        assert!(!codec().can_encode(&map));
        assert!(codec().can_encode(&Envelope::ok(1)));
    }
}
