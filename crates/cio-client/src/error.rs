//! Error types for Context.IO API calls.

use cio_config::ConfigError;
use cio_oauth::OAuthError;

/// Error from Context.IO API operations.
///
/// Transport failures and HTTP error statuses are kept apart from
/// [`OAuthError`] so a network problem is never reported as a bad signature.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Transport(#[from] ureq::Error),

    /// HTTP response error (server returned a non-2xx status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// Response content type is not one the endpoint accepts.
    #[error("unexpected content type '{content_type}', expected one of {expected:?}")]
    UnexpectedContentType {
        /// Content type sent by the server.
        content_type: String,
        /// Content types the endpoint accepts.
        expected: Vec<String>,
    },

    /// Request could not be signed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] OAuthError),

    /// Client configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error (reading upload files).
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Caller passed unknown, missing or malformed arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ClientError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}
