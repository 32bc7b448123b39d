//! Error types for OAuth signing and verification.

use std::str::Utf8Error;

/// Error from signing or verifying an OAuth 1.0 request.
///
/// Every variant is terminal for the request being processed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum OAuthError {
    /// `oauth_version` present and not `1.0`.
    #[error("OAuth version '{0}' not supported")]
    UnsupportedVersion(String),

    /// `oauth_consumer_key` missing or not known to the consumer store.
    #[error("unknown consumer: {0}")]
    UnknownConsumer(String),

    /// `oauth_token` does not resolve for the consumer and token type.
    #[error("invalid {token_type} token: {token}")]
    InvalidToken {
        /// Required token type ("request" or "access").
        token_type: String,
        /// Token key as supplied (empty when absent).
        token: String,
    },

    /// `oauth_timestamp` missing.
    #[error("missing timestamp parameter")]
    MissingTimestamp,

    /// `oauth_timestamp` outside the freshness window.
    #[error("expired timestamp, yours {timestamp}, ours {now}")]
    ExpiredTimestamp {
        /// Timestamp from the request.
        timestamp: u64,
        /// Server clock at verification time.
        now: u64,
    },

    /// `oauth_nonce` missing.
    #[error("missing nonce parameter")]
    MissingNonce,

    /// Nonce already used for this consumer, token and timestamp.
    #[error("nonce already used: {0}")]
    NonceReplay(String),

    /// Signature method missing or not registered.
    #[error("signature method '{0}' not supported")]
    UnsupportedSignatureMethod(String),

    /// Recomputed signature differs from the supplied one.
    #[error("invalid signature")]
    InvalidSignature,

    /// Input that cannot be canonicalized (bad URL, bad encoding, bad header).
    #[error("malformed parameters: {0}")]
    MalformedParameters(String),

    /// Signature method needs a key that was not configured.
    #[error("{method} requires a {key} key")]
    KeyUnavailable {
        /// Signature method name.
        method: &'static str,
        /// Missing key kind ("private" or "public").
        key: &'static str,
    },
}

impl OAuthError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedParameters(message.into())
    }
}

/// RSA key loading/parsing error.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum KeyError {
    /// Key file could not be read.
    #[error("failed to read key file")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 in key file.
    #[error("invalid UTF-8 in key")]
    InvalidUtf8(#[from] Utf8Error),

    /// PKCS#1 key parsing error.
    #[error("PKCS#1 key error")]
    Pkcs1(#[from] rsa::pkcs1::Error),

    /// PKCS#8 key parsing error (returned when both formats fail).
    #[error("PKCS#8 key error")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    /// SPKI public key parsing error.
    #[error("public key error")]
    Spki(#[from] rsa::pkcs8::spki::Error),
}
