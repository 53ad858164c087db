//! Request and response types exchanged with the console API.
//!
//! All bodies are JSON. Successful responses may arrive wrapped in a
//! `{"data": ...}` envelope; see [`unwrap_envelope`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header naming the top-level body fields that carry RSA ciphertext.
///
/// Sent as `X-Encrypted-Fields: password,otp`. Stored lowercase so it can be
/// used directly as a static header name.
pub const ENCRYPTED_FIELDS_HEADER: &str = "x-encrypted-fields";

/// Separator between field names in [`ENCRYPTED_FIELDS_HEADER`].
pub const ENCRYPTED_FIELDS_SEPARATOR: char = ',';

/// Key of the success envelope wrapping response payloads.
pub const ENVELOPE_DATA_KEY: &str = "data";

// ---------------------------------------------------------------------------
// Public key endpoint
// ---------------------------------------------------------------------------

/// Response body for `GET /crypto/public-key`.
///
/// Only `public_key` is read; any other fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    /// PEM text, SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`).
    pub public_key: String,
}

// ---------------------------------------------------------------------------
// Auth endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
///
/// `password` is sealed before it leaves the client.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Normalised result of `POST /auth/login`.
///
/// The server answers in one of two shapes:
///
/// - token deployments: `{"token": "...", "user": {...}}`
/// - cookie-session deployments: `{"user_id": "7", "username": "admin",
///   "role": "owner", "message": "..."}`, from which `user` is built as
///   `{"id", "username", "role"}` and `token` is `None`.
///
/// Anything else fails to deserialise with [`UnexpectedLoginResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct LoginResponse {
    pub token: Option<String>,
    pub user: serde_json::Value,
}

/// A login body matching neither known shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unexpected login response")]
pub struct UnexpectedLoginResponse;

impl TryFrom<serde_json::Value> for LoginResponse {
    type Error = UnexpectedLoginResponse;

    fn try_from(body: serde_json::Value) -> Result<Self, Self::Error> {
        let serde_json::Value::Object(mut map) = body else {
            return Err(UnexpectedLoginResponse);
        };

        let token = match map.get("token") {
            Some(serde_json::Value::String(t)) if !t.is_empty() => Some(t.clone()),
            _ => None,
        };
        if let Some(token) = token {
            match map.remove("user") {
                Some(user) if !user.is_null() => {
                    return Ok(Self {
                        token: Some(token),
                        user,
                    })
                }
                _ => {}
            }
        }

        let user_id = map.get("user_id").filter(|v| is_present(v));
        let username = map.get("username").filter(|v| is_present(v));
        if user_id.is_none() && username.is_none() {
            return Err(UnexpectedLoginResponse);
        }
        let id = user_id.map_or(0, parse_user_id);
        let user = serde_json::json!({
            "id": id,
            "username": username.cloned().unwrap_or(serde_json::Value::Null),
            "role": map.get("role").cloned().unwrap_or(serde_json::Value::Null),
        });
        Ok(Self { token: None, user })
    }
}

fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => false,
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Number(n) => n.as_f64() != Some(0.0),
        _ => true,
    }
}

/// Numeric user id from a string or number; 0 when it does not parse.
fn parse_user_id(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable code, when the server provides one.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable description.
    pub message: String,
}

/// Strip the `{"data": ...}` success envelope if present.
///
/// Bodies that are not objects, or objects without a `data` key, are
/// returned unchanged.
pub fn unwrap_envelope(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.contains_key(ENVELOPE_DATA_KEY) => map
            .remove(ENVELOPE_DATA_KEY)
            .unwrap_or(serde_json::Value::Null),
        other => other,
    }
}
