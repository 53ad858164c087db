//! Error categories for non-2xx responses from the console API.

use thiserror::Error;

/// Fallback message when the server does not supply one.
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// A failed API call, classified by HTTP status.
///
/// Categories mirror what the console surfaces to operators:
/// - 401 → [`ApiError::Unauthorized`]
/// - 403 → [`ApiError::Forbidden`]
/// - 404 → [`ApiError::NotFound`]
/// - 5xx → [`ApiError::Server`]
/// - anything else → [`ApiError::Other`] with the server's message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The session or bearer token was rejected.
    #[error("authentication failed")]
    Unauthorized,

    /// The caller is authenticated but may not access the resource.
    #[error("permission denied")]
    Forbidden,

    /// The requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server failed while handling the request.
    #[error("server error (status {status})")]
    Server { status: u16 },

    /// Any other non-success status.
    #[error("request failed with status {status}: {message}")]
    Other { status: u16, message: String },
}

impl ApiError {
    /// Classify a non-success status code, keeping `message` for the catch-all.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound,
            500..=599 => ApiError::Server { status },
            _ => ApiError::Other {
                status,
                message: message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.into()),
            },
        }
    }

    /// Returns the HTTP status code this error was built from.
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::Unauthorized => 401,
            ApiError::Forbidden => 403,
            ApiError::NotFound => 404,
            ApiError::Server { status } | ApiError::Other { status, .. } => *status,
        }
    }
}
