//! Field-selective encrypted submissions to the console API.
//!
//! [`ConsoleClient::post_encrypted`] replaces the named top-level fields of a
//! JSON body with RSA ciphertext and tells the server which ones it touched
//! through the `X-Encrypted-Fields` header. The header is left off entirely
//! when no field was sealed.

pub mod fields;

pub use fields::{seal_fields, SealedPayload};

use std::sync::Arc;

use common::protocol::{LoginRequest, LoginResponse, ENCRYPTED_FIELDS_HEADER};
use http::{HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::crypto::{EncryptError, KeyError};
use crate::pubkey::{PublicKeyError, PublicKeyProvider};
use crate::transport::{ApiRequest, Transport, TransportError};

/// Default path of the login endpoint.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Fields sealed on login.
const LOGIN_SEALED_FIELDS: &[&str] = &["password"];

/// Broad failure categories, for callers that only need to branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server key could not be decoded.
    MalformedKey,
    /// A field value does not fit in one RSA block.
    MessageTooLong,
    /// The key fetch or the submission failed in transit or at the server.
    Network,
    /// The caller's payload or field list cannot be sealed.
    InvalidInput,
    /// The local random source failed.
    Internal,
}

/// Errors produced by [`ConsoleClient`].
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The payload did not serialise to a JSON object.
    #[error("payload must serialise to a JSON object")]
    NotAnObject,

    /// The payload could not be serialised at all.
    #[error("failed to serialise payload: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A named field holds a value with no text form.
    #[error("field `{field}` holds a {kind} value, which cannot be encrypted")]
    UnsupportedFieldValue { field: String, kind: &'static str },

    /// A field name cannot be listed in the marker header.
    #[error("invalid field name {0:?}")]
    InvalidFieldName(String),

    /// The server key could not be obtained.
    #[error(transparent)]
    PublicKey(#[from] PublicKeyError),

    /// Encrypting a field failed.
    #[error("failed to encrypt field `{field}`: {source}")]
    Encrypt {
        field: String,
        #[source]
        source: EncryptError,
    },

    /// The submission itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAnObject
            | Self::Serialize(_)
            | Self::UnsupportedFieldValue { .. }
            | Self::InvalidFieldName(_) => ErrorKind::InvalidInput,
            Self::PublicKey(PublicKeyError::Network(_)) => ErrorKind::Network,
            Self::PublicKey(PublicKeyError::MissingField(_) | PublicKeyError::Malformed(_)) => {
                ErrorKind::MalformedKey
            }
            Self::Encrypt { source, .. } => match source {
                EncryptError::MessageTooLong { .. } => ErrorKind::MessageTooLong,
                EncryptError::Rng(_) | EncryptError::CiphertextOverflow => ErrorKind::Internal,
            },
            Self::Transport(_) | Self::Decode(_) => ErrorKind::Network,
        }
    }

    /// The key decoding failure, if that is what went wrong.
    pub fn key_error(&self) -> Option<&KeyError> {
        match self {
            Self::PublicKey(PublicKeyError::Malformed(e)) => Some(e),
            _ => None,
        }
    }
}

/// Console API client that seals selected fields before sending them.
///
/// Clones share the transport and the public key cache.
pub struct ConsoleClient<T> {
    transport: Arc<T>,
    keys: PublicKeyProvider<T>,
    login_path: Arc<str>,
}

impl<T> Clone for ConsoleClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            keys: self.keys.clone(),
            login_path: Arc::clone(&self.login_path),
        }
    }
}

impl<T: Transport> ConsoleClient<T> {
    /// Client with a fresh key provider on the default key path.
    pub fn new(transport: Arc<T>) -> Self {
        let keys = PublicKeyProvider::new(Arc::clone(&transport));
        Self::with_provider(transport, keys)
    }

    /// Client using an existing key provider, sharing its cache.
    pub fn with_provider(transport: Arc<T>, keys: PublicKeyProvider<T>) -> Self {
        Self {
            transport,
            keys,
            login_path: DEFAULT_LOGIN_PATH.into(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        let path: String = path.into();
        self.login_path = path.into();
        self
    }

    pub fn public_keys(&self) -> &PublicKeyProvider<T> {
        &self.keys
    }

    /// POST `payload` to `path` with `fields` sealed under the server key.
    ///
    /// # Errors
    ///
    /// See [`SubmitError`]. Nothing is sent if the key cannot be obtained or
    /// any field fails to seal.
    pub async fn post_encrypted<P, R>(
        &self,
        path: &str,
        payload: &P,
        fields: &[&str],
    ) -> Result<R, SubmitError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = match serde_json::to_value(payload).map_err(SubmitError::Serialize)? {
            serde_json::Value::Object(map) => map,
            _ => return Err(SubmitError::NotAnObject),
        };

        let key = self.keys.get().await?;
        let sealed = seal_fields(body, fields, &key.key)?;
        debug!(path, sealed = ?sealed.encrypted_fields, "submitting sealed payload");

        let marker = sealed.marker();
        let mut request = ApiRequest::post(path, sealed.payload);
        if let Some(marker) = marker {
            // Names were checked individually by `seal_fields`.
            let value = HeaderValue::try_from(marker)
                .map_err(|e| TransportError::Build(http::Error::from(e)))?;
            request = request.with_header(HeaderName::from_static(ENCRYPTED_FIELDS_HEADER), value);
        }

        let response = self.transport.send(request).await?;
        serde_json::from_value(response).map_err(SubmitError::Decode)
    }

    /// Log in with the password sealed.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, SubmitError> {
        let request = LoginRequest {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let response: LoginResponse = self
            .post_encrypted(&self.login_path, &request, LOGIN_SEALED_FIELDS)
            .await?;
        info!(username, token_issued = response.token.is_some(), "login accepted");
        Ok(response)
    }
}
