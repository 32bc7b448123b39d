//! The `HMAC-SHA1` signature method (RFC 5849 Section 3.4.2).

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::{SignatureMethod, signing_key};
use crate::error::OAuthError;

/// HMAC-SHA1 keyed with `enc(consumer_secret)&enc(token_secret)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1;

impl HmacSha1 {
    /// Method name as sent in `oauth_signature_method`.
    pub const NAME: &'static str = "HMAC-SHA1";
}

impl SignatureMethod for HmacSha1 {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn sign(
        &self,
        base_string: &str,
        consumer_secret: &str,
        token_secret: Option<&str>,
    ) -> Result<String, OAuthError> {
        let key = signing_key(consumer_secret, token_secret);
        // HMAC accepts keys of any length
        let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
            .map_err(|e| OAuthError::malformed(format!("HMAC key: {e}")))?;
        mac.update(base_string.as_bytes());
        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// OAuth Core 1.0, Appendix A.5.
    #[test]
    fn test_oauth_core_appendix_signature() {
        let base = "GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26\
                    oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26\
                    oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26\
                    oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal";

        let signature = HmacSha1
            .sign(base, "kd94hf93k423kf44", Some("pfkkdhi9sl3r4s00"))
            .unwrap();

        assert_eq!(signature, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");
    }

    #[test]
    fn test_round_trip() {
        let base = "POST&https%3A%2F%2Fexample.com%2F&a%3D1";
        let signature = HmacSha1.sign(base, "secret", Some("token")).unwrap();

        assert!(HmacSha1.verify(base, "secret", Some("token"), &signature));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let base = "GET&https%3A%2F%2Fexample.com%2F&";
        let signature = HmacSha1.sign(base, "secret", None).unwrap();

        assert!(!HmacSha1.verify(base, "other", None, &signature));
        assert!(!HmacSha1.verify(base, "secret", Some("t"), &signature));
    }

    #[test]
    fn test_tampered_base_string_fails() {
        let base = "GET&https%3A%2F%2Fexample.com%2Fa&limit%3D10";
        let signature = HmacSha1.sign(base, "cs", None).unwrap();

        for i in 0..base.len() {
            let mut tampered = base.as_bytes().to_vec();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8(tampered).unwrap();
            assert!(
                !HmacSha1.verify(&tampered, "cs", None, &signature),
                "tamper at {i} accepted"
            );
        }
    }

    #[test]
    fn test_tampered_signature_fails() {
        let base = "GET&https%3A%2F%2Fexample.com%2Fa&limit%3D10";
        let signature = HmacSha1.sign(base, "cs", None).unwrap();

        for i in 0..signature.len() {
            let mut tampered = signature.as_bytes().to_vec();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8(tampered).unwrap();
            assert!(!HmacSha1.verify(base, "cs", None, &tampered));
        }
    }
}
