//! Server public key retrieval and caching.
//!
//! # Lifecycle
//!
//! 1. The first [`PublicKeyProvider::get`] fetches `GET /crypto/public-key`,
//!    parses the PEM and stores both in the [`PublicKeyCache`].
//! 2. Every later `get` returns the cached entry without a network call.
//! 3. The entry never expires. [`PublicKeyProvider::force_refresh`] is the
//!    only way to replace it.
//!
//! Concurrent first calls are not de-duplicated: each caller that sees an
//! empty slot issues its own fetch, and the last one to finish wins.

pub mod cache;

pub use cache::{CachedKey, PublicKeyCache};

use std::sync::Arc;

use common::protocol::PublicKeyResponse;
use thiserror::Error;
use tracing::{debug, info};

use crate::crypto::{KeyError, RsaPublicKey};
use crate::transport::{ApiRequest, Transport, TransportError};

/// Default path of the key endpoint, relative to the API base URL.
pub const DEFAULT_PUBLIC_KEY_PATH: &str = "/crypto/public-key";

/// Errors produced while obtaining the server key.
#[derive(Debug, Error)]
pub enum PublicKeyError {
    /// The key endpoint could not be reached or answered with an error.
    #[error("public key fetch failed: {0}")]
    Network(#[from] TransportError),

    /// The response has no string `public_key` field.
    #[error("public key response is missing `public_key`: {0}")]
    MissingField(#[source] serde_json::Error),

    /// The PEM could not be parsed.
    #[error("malformed public key: {0}")]
    Malformed(#[from] KeyError),
}

/// Fetches the server key once and serves it from a [`PublicKeyCache`].
///
/// Clones share the transport and the cache, so one provider per API
/// endpoint is enough for a whole process. Tests create fresh instances.
pub struct PublicKeyProvider<T> {
    transport: Arc<T>,
    path: Arc<str>,
    cache: PublicKeyCache,
}

impl<T> Clone for PublicKeyProvider<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            path: Arc::clone(&self.path),
            cache: self.cache.clone(),
        }
    }
}

impl<T: Transport> PublicKeyProvider<T> {
    /// Provider for [`DEFAULT_PUBLIC_KEY_PATH`] with an empty cache.
    pub fn new(transport: Arc<T>) -> Self {
        Self::with_path(transport, DEFAULT_PUBLIC_KEY_PATH)
    }

    /// Provider for a custom key endpoint path.
    pub fn with_path(transport: Arc<T>, path: impl Into<String>) -> Self {
        let path: String = path.into();
        Self {
            transport,
            path: path.into(),
            cache: PublicKeyCache::new(),
        }
    }

    /// Returns `true` once a key is cached.
    pub fn is_populated(&self) -> bool {
        self.cache.is_populated()
    }

    /// The cached key, fetching it first if the slot is empty.
    ///
    /// # Errors
    ///
    /// Any [`PublicKeyError`] from the fetch. Failures are not cached; the
    /// next call fetches again.
    pub async fn get(&self) -> Result<Arc<CachedKey>, PublicKeyError> {
        if let Some(entry) = self.cache.get() {
            return Ok(entry);
        }
        self.force_refresh().await
    }

    /// The server's PEM text.
    pub async fn pem(&self) -> Result<String, PublicKeyError> {
        Ok(self.get().await?.pem.clone())
    }

    /// Fetch the key unconditionally and replace the cached entry.
    ///
    /// On failure the previous entry, if any, is retained.
    pub async fn force_refresh(&self) -> Result<Arc<CachedKey>, PublicKeyError> {
        let entry = fetch_public_key(self.transport.as_ref(), &self.path).await?;
        info!(
            format = ?entry.key.format(),
            bits = entry.key.bits(),
            fingerprint = %entry.key.fingerprint(),
            "server public key cached"
        );
        Ok(self.cache.store(entry))
    }
}

/// Fetch and parse the server key from `path`.
///
/// # Errors
///
/// [`PublicKeyError::Network`] if the call fails,
/// [`PublicKeyError::MissingField`] if the body lacks `public_key`,
/// [`PublicKeyError::Malformed`] if the PEM does not parse.
pub async fn fetch_public_key<T: Transport + ?Sized>(
    transport: &T,
    path: &str,
) -> Result<CachedKey, PublicKeyError> {
    debug!(path, "fetching server public key");
    let body = transport.send(ApiRequest::get(path)).await?;
    let response: PublicKeyResponse =
        serde_json::from_value(body).map_err(PublicKeyError::MissingField)?;
    let key = RsaPublicKey::from_pem(&response.public_key)?;
    Ok(CachedKey {
        pem: response.public_key,
        key,
    })
}
