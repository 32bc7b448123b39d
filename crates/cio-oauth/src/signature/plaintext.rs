//! The `PLAINTEXT` signature method (RFC 5849 Section 3.4.4).

use super::{SignatureMethod, signing_key};
use crate::error::OAuthError;

/// Sends the signing key itself as the signature.
///
/// Only safe over TLS. Never registered by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl Plaintext {
    /// Method name as sent in `oauth_signature_method`.
    pub const NAME: &'static str = "PLAINTEXT";
}

impl SignatureMethod for Plaintext {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn sign(
        &self,
        _base_string: &str,
        consumer_secret: &str,
        token_secret: Option<&str>,
    ) -> Result<String, OAuthError> {
        Ok(signing_key(consumer_secret, token_secret))
    }
}
