//! [`HyperTransport`]: JSON-over-HTTPS client for the console API.
//!
//! Built on the hyper-util legacy client with a rustls connector (ring
//! provider, webpki roots). Plain `http://` base URLs are allowed for local
//! development.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use common::protocol::{unwrap_envelope, ErrorResponse};
use common::ApiError;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use super::{ApiRequest, Transport, TransportError};

/// Default per-request timeout, covering connect, send and body read.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const APPLICATION_JSON: &str = "application/json";

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// [`Transport`] backed by a pooled hyper client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HyperTransport {
    client: HttpsClient,
    /// Absolute base URL without a trailing slash.
    base_url: Arc<str>,
    bearer_token: Option<Arc<str>>,
    timeout: Duration,
}

impl HyperTransport {
    /// Create a transport for `base_url` (e.g. `https://console.example.com/api/v1`).
    ///
    /// # Errors
    ///
    /// [`TransportError::InvalidBaseUrl`] unless `base_url` is an absolute
    /// http(s) URL; [`TransportError::Tls`] if the TLS config cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = normalise_base_url(base_url)?;

        let connector = HttpsConnectorBuilder::new()
            .with_provider_and_webpki_roots(rustls::crypto::ring::default_provider())?
            .https_or_http()
            .enable_http1()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            base_url: base_url.into(),
            bearer_token: None,
            timeout,
        })
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into().into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn uri_for(&self, path: &str) -> Result<Uri, TransportError> {
        let path = path.trim_start_matches('/');
        Ok(format!("{}/{path}", self.base_url).parse()?)
    }

    async fn exchange(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<(StatusCode, Bytes), TransportError> {
        let response = self.client.request(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        Ok((status, body))
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: ApiRequest) -> Result<serde_json::Value, TransportError> {
        let ApiRequest {
            method,
            path,
            headers,
            body,
        } = request;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(self.uri_for(&path)?)
            .header(ACCEPT, APPLICATION_JSON);
        let payload = match body {
            Some(value) => {
                builder = builder.header(CONTENT_TYPE, APPLICATION_JSON);
                Bytes::from(serde_json::to_vec(&value)?)
            }
            None => Bytes::new(),
        };
        if let Some(token) = &self.bearer_token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        let http_request = builder.body(Full::new(payload))?;

        debug!(method = %method, path = %path, "sending API request");
        let (status, body) = tokio::time::timeout(self.timeout, self.exchange(http_request))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;
        debug!(method = %method, path = %path, status = status.as_u16(), "API response received");

        decode_response(status, &body)
    }
}

/// Validate and normalise the base URL: absolute http(s), no trailing slash.
fn normalise_base_url(raw: &str) -> Result<String, TransportError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let uri: Uri = trimmed
        .parse()
        .map_err(|_| TransportError::InvalidBaseUrl(raw.to_owned()))?;
    match (uri.scheme_str(), uri.authority()) {
        (Some("http" | "https"), Some(_)) => Ok(trimmed.to_owned()),
        _ => Err(TransportError::InvalidBaseUrl(raw.to_owned())),
    }
}

/// Map a status and body onto the transport's response contract.
fn decode_response(status: StatusCode, body: &[u8]) -> Result<serde_json::Value, TransportError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .map(|e| e.message);
        let err = ApiError::from_status(status.as_u16(), message);
        warn!(status = status.as_u16(), error = %err, "API request failed");
        return Err(err.into());
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Null);
    }
    Ok(unwrap_envelope(serde_json::from_slice(body)?))
}
