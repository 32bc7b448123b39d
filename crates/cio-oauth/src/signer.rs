//! Outgoing request signing (RFC 5849 Section 3).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngExt;

use crate::credentials::Credentials;
use crate::error::OAuthError;
use crate::params::Parameters;
use crate::request::{
    HttpMethod, OAUTH_CALLBACK, OAUTH_CONSUMER_KEY, OAUTH_NONCE, OAUTH_TIMESTAMP, OAUTH_TOKEN,
    OAUTH_VERIFIER, OAUTH_VERSION, OAUTH_VERSION_1, OAuthRequest, with_query,
};
use crate::signature::{HmacSha1, SignatureMethod};

/// Content type of form-encoded request bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Generate cryptographically random nonce (64 hex characters).
pub fn generate_nonce() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// Current Unix time in seconds.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Where the protocol parameters travel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    /// `Authorization: OAuth ...` header; application parameters in the
    /// query (GET/DELETE) or a form body (POST/PUT).
    #[default]
    Header,
    /// Protocol and application parameters in the query string, no body.
    Query,
    /// Same layout as [`AuthMode::Query`], handed out as one composed URL.
    Url,
}

impl AuthMode {
    /// Lower-case name used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Query => "query",
            Self::Url => "url",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "header" => Ok(Self::Header),
            "query" => Ok(Self::Query),
            "url" => Ok(Self::Url),
            _ => Err(OAuthError::malformed(format!("unknown auth mode '{s}'"))),
        }
    }
}

/// Input of a single signing operation.
///
/// Built fresh per call. `nonce` and `timestamp` are generated unless set
/// explicitly, which only makes sense for reproducible signatures.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    method: HttpMethod,
    url: String,
    params: Parameters,
    callback: Option<String>,
    verifier: Option<String>,
    nonce: Option<String>,
    timestamp: Option<u64>,
}

impl SigningRequest {
    /// Start a request for `method` and `url` (the URL may carry a query).
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Parameters::new(),
            callback: None,
            verifier: None,
            nonce: None,
            timestamp: None,
        }
    }

    /// Replace the application parameters.
    #[must_use]
    pub fn params(mut self, params: Parameters) -> Self {
        self.params = params;
        self
    }

    /// Append one application parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.append(key, value);
        self
    }

    /// Set `oauth_callback` (request-token phase).
    #[must_use]
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Set `oauth_verifier` (access-token phase).
    #[must_use]
    pub fn verifier(mut self, verifier: impl Into<String>) -> Self {
        self.verifier = Some(verifier.into());
        self
    }

    /// Use a fixed nonce instead of a random one.
    #[must_use]
    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Use a fixed timestamp instead of the current time.
    #[must_use]
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Signed request ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Full URL including any query string.
    pub url: String,
    /// Headers to send (`Authorization`, `Content-Type`).
    pub headers: Vec<(String, String)>,
    /// Request body, if any.
    pub body: Option<Vec<u8>>,
}

impl SignedRequest {
    /// First header with `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add a header.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }
}

/// Signs outgoing requests with one credential pair and one method.
#[derive(Clone)]
pub struct Signer {
    credentials: Credentials,
    method: Arc<dyn SignatureMethod>,
}

impl Signer {
    /// HMAC-SHA1 signer.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            method: Arc::new(HmacSha1),
        }
    }

    /// Use another signature method.
    #[must_use]
    pub fn with_method(mut self, method: Arc<dyn SignatureMethod>) -> Self {
        self.method = method;
        self
    }

    /// Credentials this signer uses.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Signature method name.
    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    /// Same signer without the token (two-legged calls).
    #[must_use]
    pub fn without_token(&self) -> Self {
        Self {
            credentials: self.credentials.without_token(),
            method: Arc::clone(&self.method),
        }
    }

    /// Add protocol parameters to the request and sign it.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MalformedParameters`] for a bad URL or an
    /// application parameter named `oauth_*`, or the signature method's error.
    pub fn authorize(&self, request: SigningRequest) -> Result<OAuthRequest, OAuthError> {
        if let Some((key, _)) = request.params.iter().find(|(k, _)| k.starts_with("oauth_")) {
            return Err(OAuthError::malformed(format!(
                "application parameter '{key}' uses the reserved oauth_ prefix"
            )));
        }

        let mut oauth = OAuthRequest::new(request.method, &request.url, request.params)?;
        let consumer = &self.credentials.consumer;
        let token = self.credentials.token.as_ref();

        oauth.set_parameter(OAUTH_CONSUMER_KEY, consumer.key());
        oauth.set_parameter(OAUTH_NONCE, request.nonce.unwrap_or_else(generate_nonce));
        oauth.set_parameter(
            OAUTH_TIMESTAMP,
            request.timestamp.unwrap_or_else(unix_now).to_string(),
        );
        oauth.set_parameter(OAUTH_VERSION, OAUTH_VERSION_1);
        if let Some(token) = token {
            oauth.set_parameter(OAUTH_TOKEN, token.key());
        }
        if let Some(callback) = request.callback {
            oauth.set_parameter(OAUTH_CALLBACK, callback);
        }
        if let Some(verifier) = request.verifier {
            oauth.set_parameter(OAUTH_VERIFIER, verifier);
        }

        oauth.sign(self.method.as_ref(), consumer, token)?;
        Ok(oauth)
    }

    /// Sign a request and render it in `mode`.
    ///
    /// # Errors
    ///
    /// See [`authorize`](Self::authorize).
    pub fn sign(
        &self,
        request: SigningRequest,
        mode: AuthMode,
    ) -> Result<SignedRequest, OAuthError> {
        let oauth = self.authorize(request)?;
        Ok(render(&oauth, mode))
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("credentials", &self.credentials)
            .field("method", &self.method.name())
            .finish()
    }
}

/// Sign with HMAC-SHA1 in one call.
///
/// # Errors
///
/// See [`Signer::authorize`].
pub fn build_signed_request(
    credentials: &Credentials,
    method: HttpMethod,
    url: &str,
    params: Parameters,
    mode: AuthMode,
) -> Result<SignedRequest, OAuthError> {
    Signer::new(credentials.clone()).sign(SigningRequest::new(method, url).params(params), mode)
}

/// Lay out a signed request so the transmitted parameter set equals the
/// signed parameter set.
fn render(oauth: &OAuthRequest, mode: AuthMode) -> SignedRequest {
    let method = oauth.method();
    let application = oauth.application_parameters();
    let mut headers = Vec::new();

    let (url, body) = match mode {
        AuthMode::Header => {
            headers.push(("Authorization".to_owned(), oauth.to_header()));
            let query = application.to_query_string();
            match (method.has_body(), application.is_empty()) {
                (false, _) => (with_query(oauth.base_url(), &query), None),
                (true, true) => (oauth.base_url().to_owned(), None),
                (true, false) => {
                    headers.push(("Content-Type".to_owned(), FORM_CONTENT_TYPE.to_owned()));
                    (oauth.base_url().to_owned(), Some(query.into_bytes()))
                }
            }
        }
        AuthMode::Query | AuthMode::Url => (oauth.to_url(), None),
    };

    SignedRequest {
        method,
        url,
        headers,
        body,
    }
}
