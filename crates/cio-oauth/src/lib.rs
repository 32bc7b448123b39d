//! OAuth 1.0 (RFC 5849) signing and verification for the Context.IO API.
//!
//! The crate covers both sides of the protocol:
//!
//! - [`Signer`] adds protocol parameters to an outgoing request, signs it and
//!   renders it as an `Authorization` header, a signed query or a single URL
//!   (see [`AuthMode`]).
//! - [`Server`] reconstructs the signature base string of an inbound
//!   [`OAuthRequest`] and checks version, consumer, token, timestamp, nonce
//!   and signature, in that order.
//!
//! Signature methods are strategies behind the [`SignatureMethod`] trait,
//! looked up by name in a [`SignatureMethods`] registry. Only `HMAC-SHA1` is
//! registered by default; `PLAINTEXT` and `RSA-SHA1` must be added explicitly.
//!
//! # Example
//!
//! ```ignore
//! use cio_oauth::{AuthMode, Consumer, Credentials, HttpMethod, Signer, SigningRequest};
//!
//! let signer = Signer::new(Credentials::consumer_only(Consumer::new("ck", "cs")));
//! let signed = signer.sign(
//!     SigningRequest::new(HttpMethod::Get, "https://api.context.io/2.0/accounts")
//!         .param("limit", "10"),
//!     AuthMode::Header,
//! )?;
//! assert!(signed.header("Authorization").is_some());
//! ```

mod canonical;
mod credentials;
mod error;
mod key;
mod params;
mod request;
mod server;
mod signature;
mod signer;
mod store;

pub use canonical::{NormalizedUrl, normalize_parameters, normalize_url, signature_base_string};
pub use credentials::{Consumer, Credentials, Token, TokenType};
pub use error::{KeyError, OAuthError};
pub use key::{load_private_key, load_private_key_from_file, load_public_key};
pub use params::{Parameters, decode, encode};
pub use request::{
    HttpMethod, OAUTH_CALLBACK, OAUTH_CONSUMER_KEY, OAUTH_NONCE, OAUTH_SIGNATURE_METHOD,
    OAUTH_TIMESTAMP, OAUTH_TOKEN, OAUTH_VERIFIER, OAUTH_VERSION, OAUTH_VERSION_1, OAuthRequest,
    parse_authorization_header,
};
pub use server::{DEFAULT_TIMESTAMP_THRESHOLD, Server, Verified};
pub use signature::{
    HmacSha1, Plaintext, RsaSha1, SignatureMethod, SignatureMethods, constant_time_eq,
};
pub use signer::{
    AuthMode, FORM_CONTENT_TYPE, SignedRequest, Signer, SigningRequest, build_signed_request,
    generate_nonce,
};
pub use store::{ConsumerStore, MemoryStore, NonceRecord, NonceStore, TokenIssuer, TokenStore};
