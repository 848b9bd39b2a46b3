//! # HTTP Capability
//!
//! The injectable seam between the client and the network. Requests and
//! responses are plain data; `HttpTransport` executes one round trip.
//! `ReqwestTransport` is the default implementation, tests swap in stubs.

use async_trait::async_trait;
use paymennt_core::{PaymenntError, PaymenntResult, TransportError, TransportErrorKind};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built request, ready to send
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Per-request deadline; `None` keeps the capability's default
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// First header value matching `name` case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body text of a completed round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes a single HTTP round trip.
///
/// Implementations must not retry; a non-2xx status is a successful round
/// trip and is returned as an `HttpResponse`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `HttpTransport` backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build with an optional client-wide timeout.
    ///
    /// A client that cannot be constructed is a `Configuration` error.
    pub fn new(timeout: Option<Duration>) -> PaymenntResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(client_build_error)?;
        Ok(Self { client })
    }

    /// Wrap an existing, caller-configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => self.client.post(request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(HttpResponse { status, body })
    }
}

fn client_build_error(err: reqwest::Error) -> PaymenntError {
    PaymenntError::Configuration(format!("failed to create HTTP client: {err}"))
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_builder() {
        TransportErrorKind::InvalidRequest
    } else {
        TransportErrorKind::Request
    };
    TransportError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse("https://api.paymennt.com/mer/v2.0/checkout/1").unwrap(),
            headers: vec![("X-Paymennt-Api-Key".to_string(), "key".to_string())],
            body: None,
            timeout: None,
        };
        assert_eq!(request.header("x-paymennt-api-key"), Some("key"));
        assert_eq!(request.header("content-type"), None);
    }

    #[test]
    fn test_response_success_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_client_build_failure_is_configuration_error() {
        let err = Client::new().get("not a url").build().unwrap_err();
        assert!(matches!(client_build_error(err), PaymenntError::Configuration(_)));
        assert!(ReqwestTransport::new(Some(Duration::from_secs(1))).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connect() {
        let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: Url::parse("http://127.0.0.1:1/mer/v2.0/checkout/1").unwrap(),
            headers: Vec::new(),
            body: None,
            timeout: None,
        };

        let err = transport.execute(request).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Connect);
    }
}
