//! Provider-side verification of signed requests (RFC 5849 Section 3.2).
//!
//! A request passes through these checks in order, and the first failure is
//! returned:
//!
//! 1. `oauth_version`, when present, must be `1.0`
//! 2. `oauth_consumer_key` must resolve through the [`ConsumerStore`]
//! 3. `oauth_token` must resolve through the [`TokenStore`] when the flow needs one
//! 4. `oauth_timestamp` must be within the freshness window
//! 5. `oauth_nonce` must not have been seen for the same consumer, token and timestamp
//! 6. `oauth_signature_method` must be registered
//! 7. `oauth_signature` must match the recomputed signature
//!
//! The nonce is recorded only once every check has passed.

use std::fmt;
use std::sync::Arc;

use crate::credentials::{Consumer, Token, TokenType};
use crate::error::OAuthError;
use crate::request::{
    OAUTH_CALLBACK, OAUTH_CONSUMER_KEY, OAUTH_NONCE, OAUTH_SIGNATURE_METHOD, OAUTH_TIMESTAMP,
    OAUTH_TOKEN, OAUTH_VERIFIER, OAUTH_VERSION, OAUTH_VERSION_1, OAuthRequest,
};
use crate::signature::{SignatureMethod, SignatureMethods};
use crate::signer::unix_now;
use crate::store::{ConsumerStore, NonceStore, TokenIssuer, TokenStore};

/// Default freshness window for `oauth_timestamp`, in seconds.
pub const DEFAULT_TIMESTAMP_THRESHOLD: u64 = 300;

/// Credentials resolved from an accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    /// Calling application.
    pub consumer: Consumer,
    /// Resolved token, `None` for two-legged requests.
    pub token: Option<Token>,
}

/// Which token a flow needs.
#[derive(Debug, Clone, Copy)]
enum TokenPolicy {
    /// Token parameters are not looked at.
    Ignore,
    /// Resolve as `TokenType` if `oauth_token` is present.
    IfPresent(TokenType),
    /// `oauth_token` must be present and resolve as `TokenType`.
    Require(TokenType),
}

/// OAuth 1.0 verification server.
///
/// Holds the consumer, token and nonce collaborators and the signature
/// methods it accepts. Verification itself has no state beyond the nonce
/// store, so a `Server` can be shared between threads.
#[derive(Clone)]
pub struct Server {
    consumers: Arc<dyn ConsumerStore>,
    tokens: Arc<dyn TokenStore>,
    nonces: Arc<dyn NonceStore>,
    methods: SignatureMethods,
    timestamp_threshold: u64,
}

impl Server {
    /// Create a server accepting `HMAC-SHA1` only.
    pub fn new(
        consumers: Arc<dyn ConsumerStore>,
        tokens: Arc<dyn TokenStore>,
        nonces: Arc<dyn NonceStore>,
    ) -> Self {
        Self {
            consumers,
            tokens,
            nonces,
            methods: SignatureMethods::with_defaults(),
            timestamp_threshold: DEFAULT_TIMESTAMP_THRESHOLD,
        }
    }

    /// Create a server backed by a single store implementing every collaborator.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ConsumerStore + TokenStore + NonceStore + 'static,
    {
        let consumers: Arc<dyn ConsumerStore> = Arc::<S>::clone(&store);
        let tokens: Arc<dyn TokenStore> = Arc::<S>::clone(&store);
        Self::new(consumers, tokens, store)
    }

    /// Set the freshness window in seconds.
    #[must_use]
    pub fn with_timestamp_threshold(mut self, seconds: u64) -> Self {
        self.timestamp_threshold = seconds;
        self
    }

    /// Accept an additional signature method.
    pub fn add_signature_method(&mut self, method: Arc<dyn SignatureMethod>) {
        self.methods.register(method);
    }

    /// Signature methods this server accepts.
    pub fn signature_methods(&self) -> &SignatureMethods {
        &self.methods
    }

    /// Freshness window in seconds.
    pub fn timestamp_threshold(&self) -> u64 {
        self.timestamp_threshold
    }

    /// Verify a resource request.
    ///
    /// A request carrying `oauth_token` must present a valid access token; a
    /// request without one is two-legged and resolves only the consumer.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as an [`OAuthError`].
    pub fn verify_request(&self, request: &OAuthRequest) -> Result<Verified, OAuthError> {
        self.check(request, TokenPolicy::IfPresent(TokenType::Access))
            .inspect_err(|e| tracing::warn!(error = %e, "rejected resource request"))
    }

    /// Verify a temporary-credential request and issue a request token.
    ///
    /// `oauth_callback` is handed to the issuer.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as an [`OAuthError`].
    pub fn fetch_request_token(
        &self,
        request: &OAuthRequest,
        issuer: &dyn TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let verified = self
            .check(request, TokenPolicy::Ignore)
            .inspect_err(|e| tracing::warn!(error = %e, "rejected request token request"))?;

        let callback = request.parameter(OAUTH_CALLBACK);
        let token = issuer.new_request_token(&verified.consumer, callback);
        tracing::info!(consumer = verified.consumer.key(), "issued request token");
        Ok(token)
    }

    /// Verify a token-credential request and exchange the request token for
    /// an access token.
    ///
    /// # Errors
    ///
    /// Returns the first failed check as an [`OAuthError`], or
    /// [`OAuthError::InvalidToken`] if the issuer refuses the exchange.
    pub fn fetch_access_token(
        &self,
        request: &OAuthRequest,
        issuer: &dyn TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let verified = self
            .check(request, TokenPolicy::Require(TokenType::Request))
            .inspect_err(|e| tracing::warn!(error = %e, "rejected access token request"))?;
        let Some(request_token) = verified.token else {
            return Err(invalid_token(TokenType::Request, ""));
        };

        let verifier = request.parameter(OAUTH_VERIFIER);
        let access = issuer
            .new_access_token(&verified.consumer, &request_token, verifier)
            .ok_or_else(|| invalid_token(TokenType::Request, request_token.key()))?;
        tracing::info!(consumer = verified.consumer.key(), "issued access token");
        Ok(access)
    }

    fn check(&self, request: &OAuthRequest, policy: TokenPolicy) -> Result<Verified, OAuthError> {
        check_version(request)?;
        let consumer = self.resolve_consumer(request)?;
        let token = self.resolve_token(request, &consumer, policy)?;

        let timestamp = self.check_timestamp(request)?;
        let nonce = request
            .parameter(OAUTH_NONCE)
            .filter(|n| !n.is_empty())
            .ok_or(OAuthError::MissingNonce)?;
        if self
            .nonces
            .is_used(&consumer, token.as_ref(), nonce, timestamp)
        {
            return Err(OAuthError::NonceReplay(nonce.to_owned()));
        }

        let method_name = request.parameter(OAUTH_SIGNATURE_METHOD).unwrap_or("");
        let method = self.methods.get(method_name)?;
        let signature = request.signature().ok_or(OAuthError::InvalidSignature)?;
        let base_string = request.base_string();
        if !method.verify(
            &base_string,
            consumer.secret(),
            token.as_ref().map(Token::secret),
            signature,
        ) {
            tracing::debug!(%base_string, "signature mismatch");
            return Err(OAuthError::InvalidSignature);
        }

        if self
            .nonces
            .check_and_record(&consumer, token.as_ref(), nonce, timestamp)
        {
            return Err(OAuthError::NonceReplay(nonce.to_owned()));
        }

        tracing::debug!(
            consumer = consumer.key(),
            two_legged = token.is_none(),
            "request verified"
        );
        Ok(Verified { consumer, token })
    }

    fn resolve_consumer(&self, request: &OAuthRequest) -> Result<Consumer, OAuthError> {
        let key = request.parameter(OAUTH_CONSUMER_KEY).unwrap_or("");
        if key.is_empty() {
            return Err(OAuthError::UnknownConsumer(String::new()));
        }
        self.consumers
            .lookup_consumer(key)
            .ok_or_else(|| OAuthError::UnknownConsumer(key.to_owned()))
    }

    fn resolve_token(
        &self,
        request: &OAuthRequest,
        consumer: &Consumer,
        policy: TokenPolicy,
    ) -> Result<Option<Token>, OAuthError> {
        let key = request.parameter(OAUTH_TOKEN).filter(|k| !k.is_empty());
        let token_type = match (policy, key) {
            (TokenPolicy::Ignore, _) | (TokenPolicy::IfPresent(_), None) => return Ok(None),
            (TokenPolicy::Require(token_type), None) => {
                return Err(invalid_token(token_type, ""));
            }
            (TokenPolicy::IfPresent(token_type) | TokenPolicy::Require(token_type), Some(_)) => {
                token_type
            }
        };
        let key = key.unwrap_or("");
        self.tokens
            .lookup_token(consumer, token_type, key)
            .map(Some)
            .ok_or_else(|| invalid_token(token_type, key))
    }

    fn check_timestamp(&self, request: &OAuthRequest) -> Result<u64, OAuthError> {
        let raw = request
            .parameter(OAUTH_TIMESTAMP)
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::MissingTimestamp)?;
        let timestamp: u64 = raw
            .parse()
            .map_err(|_| OAuthError::malformed(format!("invalid timestamp '{raw}'")))?;
        let now = unix_now();
        if now.abs_diff(timestamp) > self.timestamp_threshold {
            return Err(OAuthError::ExpiredTimestamp { timestamp, now });
        }
        Ok(timestamp)
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("methods", &self.methods)
            .field("timestamp_threshold", &self.timestamp_threshold)
            .finish_non_exhaustive()
    }
}

fn check_version(request: &OAuthRequest) -> Result<(), OAuthError> {
    match request.parameter(OAUTH_VERSION) {
        Some(version) if version != OAUTH_VERSION_1 => {
            Err(OAuthError::UnsupportedVersion(version.to_owned()))
        }
        _ => Ok(()),
    }
}

fn invalid_token(token_type: TokenType, key: &str) -> OAuthError {
    OAuthError::InvalidToken {
        token_type: token_type.to_string(),
        token: key.to_owned(),
    }
}
