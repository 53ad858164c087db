//! HTTP transport boundary between the sealing logic and the console API.
//!
//! Everything above this module talks to a [`Transport`]; the production
//! implementation is [`HyperTransport`]. Tests substitute in-memory fakes.
//!
//! # Response contract
//!
//! - 2xx: the JSON body, with any `{"data": ...}` envelope removed. An empty
//!   body decodes as `null`.
//! - non-2xx: [`TransportError::Api`] classified by status.
//!
//! Nothing here retries. A failed call is reported once to the caller.

pub mod hyper_client;

#[cfg(test)]
pub(crate) mod fake;

pub use hyper_client::HyperTransport;

use std::future::Future;
use std::time::Duration;

use common::ApiError;
use http::{HeaderName, HeaderValue, Method};
use thiserror::Error;

/// Errors surfaced by a [`Transport`]. All of them are network errors from
/// the caller's point of view.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The configured base URL is not an absolute http(s) URL.
    #[error("invalid API base URL: {0:?}")]
    InvalidBaseUrl(String),

    /// Base URL and path did not form a valid URI.
    #[error("invalid request URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// The request could not be assembled (e.g. an invalid header value).
    #[error("failed to build request: {0}")]
    Build(#[from] http::Error),

    /// The TLS client configuration could not be created.
    #[error("TLS setup failed: {0}")]
    Tls(#[from] rustls::Error),

    /// Connecting or exchanging the request failed.
    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    /// No complete response within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// A 2xx body that is not JSON.
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One JSON API call, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `/auth/login`.
    pub path: String,
    /// Extra headers on top of the transport's defaults.
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// First value of `name`, if set on this request.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// Sends [`ApiRequest`]s to the console API and returns decoded JSON.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<serde_json::Value, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_has_no_body() {
        let req = ApiRequest::get("/crypto/public-key");
        assert_eq!(req.method, Method::GET);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = ApiRequest::post("/auth/login", json!({}))
            .with_header(
                HeaderName::from_static("x-encrypted-fields"),
                HeaderValue::from_static("password"),
            );
        let value = req.header("X-Encrypted-Fields").unwrap();
        assert_eq!(value.to_str().unwrap(), "password");
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn api_error_display_is_transparent() {
        let e = TransportError::from(ApiError::Unauthorized);
        assert_eq!(e.to_string(), "authentication failed");
    }
}
