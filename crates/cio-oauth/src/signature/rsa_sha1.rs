//! The `RSA-SHA1` signature method (RFC 5849 Section 3.4.3).

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;

use super::SignatureMethod;
use crate::error::OAuthError;

/// PKCS#1 v1.5 signature over SHA-1.
///
/// Shared secrets are ignored. Signing needs the consumer's private key,
/// verifying needs its public key; a server only holds the latter.
#[derive(Debug, Clone, Default)]
pub struct RsaSha1 {
    private_key: Option<RsaPrivateKey>,
    public_key: Option<RsaPublicKey>,
}

impl RsaSha1 {
    /// Method name as sent in `oauth_signature_method`.
    pub const NAME: &'static str = "RSA-SHA1";

    /// Signer side: the public key is derived from the private key.
    #[must_use]
    pub fn with_private_key(private_key: RsaPrivateKey) -> Self {
        Self {
            public_key: Some(private_key.to_public_key()),
            private_key: Some(private_key),
        }
    }

    /// Verifier side.
    #[must_use]
    pub fn with_public_key(public_key: RsaPublicKey) -> Self {
        Self {
            private_key: None,
            public_key: Some(public_key),
        }
    }
}

impl SignatureMethod for RsaSha1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn sign(
        &self,
        base_string: &str,
        _consumer_secret: &str,
        _token_secret: Option<&str>,
    ) -> Result<String, OAuthError> {
        let private_key = self.private_key.clone().ok_or(OAuthError::KeyUnavailable {
            method: Self::NAME,
            key: "private",
        })?;
        let signing_key = SigningKey::<Sha1>::new(private_key);
        let signature = signing_key.sign(base_string.as_bytes());
        Ok(BASE64_STANDARD.encode(signature.to_bytes()))
    }

    fn verify(
        &self,
        base_string: &str,
        _consumer_secret: &str,
        _token_secret: Option<&str>,
        candidate: &str,
    ) -> bool {
        let Some(public_key) = self.public_key.clone() else {
            tracing::warn!("RSA-SHA1 verification without a public key");
            return false;
        };
        let Ok(raw) = BASE64_STANDARD.decode(candidate) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(raw.as_slice()) else {
            return false;
        };
        VerifyingKey::<Sha1>::new(public_key)
            .verify(base_string.as_bytes(), &signature)
            .is_ok()
    }
}
