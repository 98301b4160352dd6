//! # Transport
//!
//! The network seam under the fetcher: one GET, no retries, no limits.
//!
//! `HttpTransport` is the production implementation over `reqwest`. Tests
//! substitute scripted transports to observe attempts and concurrency.

use crate::error::AppError;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, RETRY_AFTER};
use std::time::Duration;
use thiserror::Error;

/// Status, throttle hint and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed `Retry-After` header (delta-seconds form, fractions allowed).
    pub retry_after: Option<Duration>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// A 200 response with a JSON body.
    #[must_use]
    pub fn json(value: &serde_json::Value) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: value.to_string().into_bytes(),
        }
    }

    /// An empty-bodied response with the given status.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            retry_after: None,
            body: Vec::new(),
        }
    }

    /// A 429 response, optionally carrying a wait hint.
    #[must_use]
    pub fn throttled(retry_after: Option<Duration>) -> Self {
        Self {
            status: 429,
            retry_after,
            body: Vec::new(),
        }
    }
}

/// Failure to obtain any HTTP response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// One HTTP GET.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;
}

// =============================================================================
// REQWEST TRANSPORT
// =============================================================================

/// `reqwest`-backed transport that attaches the secret token header.
#[derive(Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    auth_header: HeaderName,
    api_key: HeaderValue,
}

impl HttpTransport {
    /// Build a transport.
    ///
    /// * `api_key` - secret token, sent on every request and never logged
    /// * `auth_header` - header carrying the token (e.g. `X-Riot-Token`)
    /// * `timeout` - per-request timeout
    pub fn new(api_key: &str, auth_header: &str, timeout: Duration) -> Result<Self, AppError> {
        let auth_header = HeaderName::from_bytes(auth_header.as_bytes())
            .map_err(|e| AppError::Config(format!("invalid auth header name: {e}")))?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| AppError::Config(format!("invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("compscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Http(e.to_string()))?;

        Ok(Self {
            http,
            auth_header,
            api_key,
        })
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

/// Parse a `Retry-After` header given in seconds, e.g. `2` or `1.5`.
///
/// Negative, non-finite and HTTP-date values yield `None`.
fn parse_retry_after(value: Option<&HeaderValue>) -> Option<Duration> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        let resp = self
            .http
            .get(url)
            .header(self.auth_header.clone(), self.api_key.clone())
            .send()
            .await
            .map_err(classify)?;

        let status = resp.status().as_u16();
        let retry_after = parse_retry_after(resp.headers().get(RETRY_AFTER));
        let body = resp.bytes().await.map_err(classify)?.to_vec();

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_seconds() {
        let value = HeaderValue::from_static(" 7 ");
        assert_eq!(parse_retry_after(Some(&value)), Some(Duration::from_secs(7)));
    }

    #[test]
    fn retry_after_fractional_seconds() {
        let value = HeaderValue::from_static("1.5");
        assert_eq!(
            parse_retry_after(Some(&value)),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn retry_after_negative_is_ignored() {
        for raw in ["-1", "-0.5", "NaN", "inf"] {
            let value = HeaderValue::from_static(raw);
            assert_eq!(parse_retry_after(Some(&value)), None, "{raw}");
        }
    }

    #[test]
    fn retry_after_http_date_is_ignored() {
        let value = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&value)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn rejects_bad_header_name() {
        let result = HttpTransport::new("key", "bad header", Duration::from_secs(5));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn builds_with_valid_settings() {
        assert!(HttpTransport::new("RGAPI-test", "X-Riot-Token", Duration::from_secs(5)).is_ok());
    }
}
