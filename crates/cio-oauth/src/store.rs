//! Collaborators of the verification server and an in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use crate::credentials::{Consumer, Token, TokenType};
use crate::signer::generate_nonce;

/// Resolves consumer keys.
pub trait ConsumerStore: Send + Sync {
    /// Consumer registered under `key`.
    fn lookup_consumer(&self, key: &str) -> Option<Consumer>;
}

/// Resolves token keys for a consumer.
pub trait TokenStore: Send + Sync {
    /// Token of `token_type` issued to `consumer` under `key`.
    fn lookup_token(&self, consumer: &Consumer, token_type: TokenType, key: &str) -> Option<Token>;
}

/// Replay detection.
///
/// Implementations must make [`check_and_record`](Self::check_and_record)
/// atomic: two concurrent calls with the same tuple return `false` at most once.
pub trait NonceStore: Send + Sync {
    /// Whether the tuple has already been recorded.
    fn is_used(&self, consumer: &Consumer, token: Option<&Token>, nonce: &str, timestamp: u64)
    -> bool;

    /// Record the tuple, returning `true` if it was already present.
    fn check_and_record(
        &self,
        consumer: &Consumer,
        token: Option<&Token>,
        nonce: &str,
        timestamp: u64,
    ) -> bool;
}

/// Issues new tokens during the three-legged flow.
pub trait TokenIssuer: Send + Sync {
    /// Issue a request token for `consumer`.
    fn new_request_token(&self, consumer: &Consumer, callback: Option<&str>) -> Token;

    /// Exchange an authorized request token for an access token.
    ///
    /// Returns `None` if the verifier does not match.
    fn new_access_token(
        &self,
        consumer: &Consumer,
        request_token: &Token,
        verifier: Option<&str>,
    ) -> Option<Token>;
}

/// Nonce store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonceRecord {
    pub consumer_key: String,
    pub token_key: Option<String>,
    pub nonce: String,
    pub timestamp: u64,
}

impl NonceRecord {
    fn new(consumer: &Consumer, token: Option<&Token>, nonce: &str, timestamp: u64) -> Self {
        Self {
            consumer_key: consumer.key().to_owned(),
            token_key: token.map(|t| t.key().to_owned()),
            nonce: nonce.to_owned(),
            timestamp,
        }
    }
}

#[derive(Debug)]
struct IssuedRequestToken {
    consumer_key: String,
    token: Token,
    callback: Option<String>,
    verifier: Option<String>,
}

/// In-memory consumer, token and nonce store.
///
/// Suitable for tests and single-process embedders. Nonces accumulate until
/// [`purge_nonces_before`](Self::purge_nonces_before) is called.
///
/// # Example
///
/// ```ignore
/// use cio_oauth::{Consumer, MemoryStore, Token, TokenType};
///
/// let store = MemoryStore::new()
///     .with_consumer(Consumer::new("ck", "cs"))
///     .with_token("ck", TokenType::Access, Token::new("tk", "ts"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    consumers: RwLock<HashMap<String, Consumer>>,
    tokens: RwLock<HashMap<(String, TokenType, String), Token>>,
    request_tokens: RwLock<HashMap<String, IssuedRequestToken>>,
    nonces: Mutex<HashSet<NonceRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_consumer(self, consumer: Consumer) -> Self {
        self.add_consumer(consumer);
        self
    }

    /// Register a token issued to `consumer_key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_token(self, consumer_key: &str, token_type: TokenType, token: Token) -> Self {
        self.add_token(consumer_key, token_type, token);
        self
    }

    /// Register a consumer.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_consumer(&self, consumer: Consumer) {
        self.consumers
            .write()
            .unwrap()
            .insert(consumer.key().to_owned(), consumer);
    }

    /// Register a token.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn add_token(&self, consumer_key: &str, token_type: TokenType, token: Token) {
        self.tokens.write().unwrap().insert(
            (consumer_key.to_owned(), token_type, token.key().to_owned()),
            token,
        );
    }

    /// Mark a request token as authorized by the user and return the
    /// verifier to hand back to the consumer.
    ///
    /// Returns `None` for an unknown request token.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn authorize_request_token(&self, token_key: &str) -> Option<String> {
        let mut issued = self.request_tokens.write().unwrap();
        let entry = issued.get_mut(token_key)?;
        let verifier = generate_nonce()[..16].to_owned();
        entry.verifier = Some(verifier.clone());
        Some(verifier)
    }

    /// Callback registered with a request token.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn callback_for(&self, token_key: &str) -> Option<String> {
        self.request_tokens
            .read()
            .unwrap()
            .get(token_key)
            .and_then(|t| t.callback.clone())
    }

    /// Drop nonce records with a timestamp older than `timestamp`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn purge_nonces_before(&self, timestamp: u64) -> usize {
        let mut nonces = self.nonces.lock().unwrap();
        let before = nonces.len();
        nonces.retain(|record| record.timestamp >= timestamp);
        before - nonces.len()
    }

    /// Number of recorded nonces.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn nonce_count(&self) -> usize {
        self.nonces.lock().unwrap().len()
    }
}

impl ConsumerStore for MemoryStore {
    fn lookup_consumer(&self, key: &str) -> Option<Consumer> {
        self.consumers.read().unwrap().get(key).cloned()
    }
}

impl TokenStore for MemoryStore {
    fn lookup_token(&self, consumer: &Consumer, token_type: TokenType, key: &str) -> Option<Token> {
        self.tokens
            .read()
            .unwrap()
            .get(&(consumer.key().to_owned(), token_type, key.to_owned()))
            .cloned()
    }
}

impl NonceStore for MemoryStore {
    fn is_used(
        &self,
        consumer: &Consumer,
        token: Option<&Token>,
        nonce: &str,
        timestamp: u64,
    ) -> bool {
        self.nonces
            .lock()
            .unwrap()
            .contains(&NonceRecord::new(consumer, token, nonce, timestamp))
    }

    fn check_and_record(
        &self,
        consumer: &Consumer,
        token: Option<&Token>,
        nonce: &str,
        timestamp: u64,
    ) -> bool {
        // insert under one lock acquisition: the check and the write are atomic
        !self
            .nonces
            .lock()
            .unwrap()
            .insert(NonceRecord::new(consumer, token, nonce, timestamp))
    }
}

impl TokenIssuer for MemoryStore {
    fn new_request_token(&self, consumer: &Consumer, callback: Option<&str>) -> Token {
        let token = Token::new(generate_nonce(), generate_nonce());
        self.add_token(consumer.key(), TokenType::Request, token.clone());
        self.request_tokens.write().unwrap().insert(
            token.key().to_owned(),
            IssuedRequestToken {
                consumer_key: consumer.key().to_owned(),
                token: token.clone(),
                callback: callback.map(str::to_owned),
                verifier: None,
            },
        );
        token
    }

    fn new_access_token(
        &self,
        consumer: &Consumer,
        request_token: &Token,
        verifier: Option<&str>,
    ) -> Option<Token> {
        let mut issued = self.request_tokens.write().unwrap();
        let entry = issued.get(request_token.key())?;
        let authorized = entry.consumer_key == consumer.key()
            && entry.token == *request_token
            && entry.verifier.is_some()
            && entry.verifier.as_deref() == verifier;
        if !authorized {
            tracing::warn!(consumer = consumer.key(), "request token not authorized");
            return None;
        }
        issued.remove(request_token.key());
        drop(issued);

        self.tokens.write().unwrap().remove(&(
            consumer.key().to_owned(),
            TokenType::Request,
            request_token.key().to_owned(),
        ));
        let access = Token::new(generate_nonce(), generate_nonce());
        self.add_token(consumer.key(), TokenType::Access, access.clone());
        Some(access)
    }
}
