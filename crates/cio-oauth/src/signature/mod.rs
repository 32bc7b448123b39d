//! Signature methods and the name-keyed registry the signer and server dispatch on.

mod hmac_sha1;
mod plaintext;
mod rsa_sha1;

pub use hmac_sha1::HmacSha1;
pub use plaintext::Plaintext;
pub use rsa_sha1::RsaSha1;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use subtle::ConstantTimeEq;

use crate::error::OAuthError;
use crate::params::encode;

/// A named strategy that signs and verifies signature base strings.
///
/// The returned signature is NOT percent-encoded; encoding happens when the
/// request is rendered.
pub trait SignatureMethod: Send + Sync {
    /// Value of `oauth_signature_method`, e.g. `HMAC-SHA1`.
    fn name(&self) -> &'static str;

    /// Compute the signature of `base_string`.
    ///
    /// # Errors
    ///
    /// Returns an error if the method cannot produce a signature (e.g. a
    /// missing RSA private key).
    fn sign(
        &self,
        base_string: &str,
        consumer_secret: &str,
        token_secret: Option<&str>,
    ) -> Result<String, OAuthError>;

    /// Check `candidate` against the signature of `base_string`.
    ///
    /// The default recomputes the signature and compares in constant time.
    fn verify(
        &self,
        base_string: &str,
        consumer_secret: &str,
        token_secret: Option<&str>,
        candidate: &str,
    ) -> bool {
        self.sign(base_string, consumer_secret, token_secret)
            .is_ok_and(|expected| constant_time_eq(&expected, candidate))
    }
}

/// Compare two signature strings in constant time.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Shared-secret signing key: `enc(consumer_secret)&enc(token_secret)`.
pub(crate) fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
    format!(
        "{}&{}",
        encode(consumer_secret),
        encode(token_secret.unwrap_or(""))
    )
}

/// Registry of signature methods keyed by name.
///
/// Lookups of unregistered names fail; there is no fallback method.
#[derive(Clone)]
pub struct SignatureMethods {
    methods: BTreeMap<&'static str, Arc<dyn SignatureMethod>>,
}

impl SignatureMethods {
    /// Empty registry. Every lookup fails until a method is registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }

    /// Registry containing only HMAC-SHA1.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut methods = Self::empty();
        methods.register(Arc::new(HmacSha1));
        methods
    }

    /// Register a method under its own name, replacing any previous one.
    pub fn register(&mut self, method: Arc<dyn SignatureMethod>) {
        self.methods.insert(method.name(), method);
    }

    /// Resolve a method by name.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::UnsupportedSignatureMethod`] if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<Arc<dyn SignatureMethod>, OAuthError> {
        self.methods
            .get(name)
            .cloned()
            .ok_or_else(|| OAuthError::UnsupportedSignatureMethod(name.to_owned()))
    }

    /// Registered method names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.methods.keys().copied().collect()
    }
}

impl Default for SignatureMethods {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for SignatureMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
