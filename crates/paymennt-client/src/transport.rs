//! # API Transport
//!
//! Turns a relative route into an authenticated request against the
//! configured base URI and runs it through the `HttpTransport` capability.
//!
//! Every request carries the API key and secret headers. Callers may add
//! headers but can never replace those two.

use crate::config::Credentials;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use paymennt_core::{PaymenntError, PaymenntResult, TransportError, TransportErrorKind};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

pub const API_KEY_HEADER: &str = "X-Paymennt-Api-Key";
pub const API_SECRET_HEADER: &str = "X-Paymennt-Api-Secret";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Per-call options forwarded to the HTTP capability
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Deadline for this call only
    pub timeout: Option<Duration>,

    /// Aborts the in-flight round trip when cancelled
    pub cancellation: Option<CancellationToken>,

    /// Extra headers; the auth headers cannot be overridden
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Authenticated request builder and sender for one base URI
#[derive(Clone)]
pub struct ApiTransport {
    credentials: Credentials,
    base_url: Url,
    http: Arc<dyn HttpTransport>,
}

impl fmt::Debug for ApiTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiTransport")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiTransport {
    pub fn new(
        credentials: Credentials,
        base_url: Url,
        http: Arc<dyn HttpTransport>,
    ) -> PaymenntResult<Self> {
        if base_url.cannot_be_a_base() {
            return Err(PaymenntError::Configuration(format!(
                "Base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            credentials,
            base_url,
            http,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join the base URI with `path` segments and append `query`.
    ///
    /// Each segment is percent-encoded on its own. `.` and `..` segments
    /// would be resolved away and are rejected, as is a query entry without
    /// a value (omit the entry instead).
    pub fn build_url(
        &self,
        path: &[&str],
        query: &[(&str, Option<String>)],
    ) -> Result<Url, TransportError> {
        if let Some(segment) = path.iter().find(|s| **s == "." || **s == "..") {
            return Err(TransportError::new(
                TransportErrorKind::InvalidRequest,
                format!("path segment '{segment}' is not allowed"),
            ));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                TransportError::new(
                    TransportErrorKind::InvalidRequest,
                    "base URL cannot carry a path",
                )
            })?;
            segments.pop_if_empty();
            segments.extend(path.iter().filter(|segment| !segment.is_empty()));
        }

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                let value = value.as_deref().ok_or_else(|| {
                    TransportError::new(
                        TransportErrorKind::InvalidRequest,
                        format!("query parameter '{key}' has no value"),
                    )
                })?;
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Auth headers, content type when a body is sent, then `extra`
    fn headers(&self, has_body: bool, extra: &[(String, String)]) -> Vec<(String, String)> {
        let mut headers = vec![
            (API_KEY_HEADER.to_string(), self.credentials.api_key().to_string()),
            (API_SECRET_HEADER.to_string(), self.credentials.api_secret().to_string()),
        ];
        if has_body {
            headers.push((CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string()));
        }

        for (name, value) in extra {
            if name.eq_ignore_ascii_case(API_KEY_HEADER)
                || name.eq_ignore_ascii_case(API_SECRET_HEADER)
            {
                warn!(header = %name, "Ignoring attempt to override authentication header");
                continue;
            }
            match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
                Some(existing) => existing.1 = value.clone(),
                None => headers.push((name.clone(), value.clone())),
            }
        }
        headers
    }

    /// Send one request and return the raw status and body.
    ///
    /// Never retries. A non-2xx status is returned as a response, not an
    /// error; classifying it is up to the caller.
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &[&str],
        query: &[(&str, Option<String>)],
        body: Option<String>,
        options: &RequestOptions,
    ) -> PaymenntResult<HttpResponse> {
        let url = self.build_url(path, query)?;
        let headers = self.headers(body.is_some(), &options.headers);

        info!(method = %method, url = %url, "Sending request");

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: options.timeout,
        };

        let response = match &options.cancellation {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(TransportError::cancelled().into());
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Request cancelled by caller");
                        return Err(TransportError::cancelled().into());
                    }
                    result = self.http.execute(request) => result?,
                }
            }
            None => self.http.execute(request).await?,
        };

        debug!(status = response.status, "Request completed");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the last request and answers with a fixed response
    #[derive(Default)]
    struct RecordingTransport {
        last: Mutex<Option<HttpRequest>>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            *self.last.lock().unwrap() = Some(request);
            Ok(HttpResponse::new(200, r#"{"success":true,"result":{}}"#))
        }
    }

    /// Never answers
    struct HangingTransport;

    #[async_trait]
    impl HttpTransport for HangingTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn transport(http: Arc<dyn HttpTransport>) -> ApiTransport {
        ApiTransport::new(
            Credentials::new("key_1", "secret_1").unwrap(),
            Url::parse("https://api.test.paymennt.com/mer/v2.0").unwrap(),
            http,
        )
        .unwrap()
    }

    #[test]
    fn test_build_url_joins_prefix_and_path() {
        let t = transport(Arc::new(RecordingTransport::default()));
        let url = t.build_url(&["checkout", "web"], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.test.paymennt.com/mer/v2.0/checkout/web");
    }

    #[test]
    fn test_build_url_with_trailing_slash_base() {
        let t = ApiTransport::new(
            Credentials::new("k", "s").unwrap(),
            Url::parse("http://localhost:8080/api/mer/v2.0/").unwrap(),
            Arc::new(RecordingTransport::default()),
        )
        .unwrap();
        let url = t.build_url(&["checkout", "chk_1"], &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/mer/v2.0/checkout/chk_1");
    }

    #[test]
    fn test_build_url_encodes_segments_and_query() {
        let t = transport(Arc::new(RecordingTransport::default()));
        let query = [("page", Some("2".to_string())), ("q", Some("x y".to_string()))];
        let url = t.build_url(&["checkout", "a/b c"], &query).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.test.paymennt.com/mer/v2.0/checkout/a%2Fb%20c?page=2&q=x+y"
        );
    }

    #[test]
    fn test_dot_segments_rejected() {
        let t = transport(Arc::new(RecordingTransport::default()));
        for id in [".", ".."] {
            let err = t.build_url(&["checkout", id], &[]).unwrap_err();
            assert_eq!(err.kind, TransportErrorKind::InvalidRequest);
        }
        let url = t.build_url(&["checkout", "..."], &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.test.paymennt.com/mer/v2.0/checkout/...");
    }

    #[test]
    fn test_absent_query_value_rejected() {
        let t = transport(Arc::new(RecordingTransport::default()));
        let err = t.build_url(&["checkout"], &[("status", None)]).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_auth_headers_cannot_be_overridden() {
        let http = Arc::new(RecordingTransport::default());
        let t = transport(http.clone());
        let options = RequestOptions::new()
            .with_header("x-paymennt-api-key", "evil")
            .with_header("X-Trace-Id", "t-1");

        t.send(HttpMethod::Get, &["checkout", "1"], &[], None, &options)
            .await
            .unwrap();

        let request = http.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.header(API_KEY_HEADER), Some("key_1"));
        assert_eq!(request.header(API_SECRET_HEADER), Some("secret_1"));
        assert_eq!(request.header("X-Trace-Id"), Some("t-1"));
        assert_eq!(request.header(CONTENT_TYPE_HEADER), None);
        assert_eq!(
            request.headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case(API_KEY_HEADER)).count(),
            1
        );
    }

    #[tokio::test]
    async fn test_content_type_sent_with_body() {
        let http = Arc::new(RecordingTransport::default());
        let t = transport(http.clone());

        let body = Some("{}".to_string());
        t.send(HttpMethod::Post, &["checkout", "web"], &[], body, &RequestOptions::new())
            .await
            .unwrap();

        let request = http.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header(CONTENT_TYPE_HEADER), Some(JSON_CONTENT_TYPE));
        assert_eq!(request.body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_timeout_is_forwarded() {
        let http = Arc::new(RecordingTransport::default());
        let t = transport(http.clone());
        let options = RequestOptions::new().with_timeout(Duration::from_secs(3));

        t.send(HttpMethod::Get, &["checkout", "1"], &[], None, &options)
            .await
            .unwrap();

        let request = http.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.timeout, Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_round_trip() {
        let t = transport(Arc::new(HangingTransport));
        let token = CancellationToken::new();
        let options = RequestOptions::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = t
            .send(HttpMethod::Get, &["checkout", "1"], &[], None, &options)
            .await
            .unwrap_err();
        canceller.await.unwrap();

        match err {
            PaymenntError::Transport(e) => assert_eq!(e.kind, TransportErrorKind::Cancelled),
            other => panic!("expected cancellation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_call() {
        let http = Arc::new(RecordingTransport::default());
        let t = transport(http.clone());
        let token = CancellationToken::new();
        token.cancel();

        let options = RequestOptions::new().with_cancellation(token);
        let result = t
            .send(HttpMethod::Get, &["checkout", "1"], &[], None, &options)
            .await;

        assert!(result.is_err());
        assert!(http.last.lock().unwrap().is_none());
    }
}
