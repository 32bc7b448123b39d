//! Consumer and token credentials.

use std::fmt;

/// Registered application identity (API key and secret).
#[derive(Clone, PartialEq, Eq)]
pub struct Consumer {
    key: String,
    secret: String,
}

impl Consumer {
    /// Create a consumer credential.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Consumer key, sent as `oauth_consumer_key`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Consumer secret, never sent.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Delegated-access grant of a specific user (three-legged flows).
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    key: String,
    secret: String,
}

impl Token {
    /// Create a token credential.
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Token key, sent as `oauth_token`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Token secret, never sent.
    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Kind of token a flow requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Temporary credentials, exchanged for an access token.
    Request,
    /// Token credentials used for resource calls.
    Access,
}

impl TokenType {
    /// Lower-case name used in errors and store lookups.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Access => "access",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credential pair handed to the signer.
///
/// `token` is `None` for two-legged (consumer-only) requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Calling application.
    pub consumer: Consumer,
    /// Optional user grant.
    pub token: Option<Token>,
}

impl Credentials {
    /// Two-legged credentials.
    pub fn consumer_only(consumer: Consumer) -> Self {
        Self {
            consumer,
            token: None,
        }
    }

    /// Three-legged credentials.
    pub fn with_token(consumer: Consumer, token: Token) -> Self {
        Self {
            consumer,
            token: Some(token),
        }
    }

    /// Same consumer without the token.
    #[must_use]
    pub fn without_token(&self) -> Self {
        Self::consumer_only(self.consumer.clone())
    }
}
