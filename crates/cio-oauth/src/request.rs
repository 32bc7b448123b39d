//! OAuth request model shared by the signer and the verification server.

use std::fmt;
use std::str::FromStr;

use crate::canonical::{OAUTH_SIGNATURE, normalize_url, signature_base_string};
use crate::credentials::{Consumer, Token};
use crate::error::OAuthError;
use crate::params::{Parameters, decode, encode};
use crate::signature::SignatureMethod;

pub const OAUTH_CALLBACK: &str = "oauth_callback";
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_TOKEN: &str = "oauth_token";
pub const OAUTH_VERIFIER: &str = "oauth_verifier";
pub const OAUTH_VERSION: &str = "oauth_version";
pub const OAUTH_VERSION_1: &str = "1.0";

/// HTTP methods the API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether application parameters travel in the request body.
    pub fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(OAuthError::malformed(format!("unsupported HTTP method '{s}'"))),
        }
    }
}

/// A request as seen by OAuth: method, normalized base URL and the full
/// parameter set (protocol, query and form parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthRequest {
    method: HttpMethod,
    base_url: String,
    params: Parameters,
}

impl OAuthRequest {
    /// Build a request, merging any query string of `url` into `params`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MalformedParameters`] if the URL cannot be normalized.
    pub fn new(method: HttpMethod, url: &str, params: Parameters) -> Result<Self, OAuthError> {
        let normalized = normalize_url(url)?;
        let mut all = normalized.query;
        all.extend(params);
        Ok(Self {
            method,
            base_url: normalized.base_url,
            params: all,
        })
    }

    /// Reconstruct an inbound request from its transmitted parts.
    ///
    /// Parameters are collected from the URL query, the form body and an
    /// `Authorization: OAuth` header. Non-OAuth authorization schemes are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MalformedParameters`] for a bad URL, a bad OAuth
    /// header, or a protocol parameter that appears more than once.
    pub fn from_parts(
        method: HttpMethod,
        url: &str,
        authorization: Option<&str>,
        form_body: Option<&Parameters>,
    ) -> Result<Self, OAuthError> {
        let mut params = form_body.cloned().unwrap_or_default();
        if let Some(header) = authorization {
            if is_oauth_scheme(header) {
                params.extend(parse_authorization_header(header)?);
            } else {
                tracing::debug!("ignoring non-OAuth authorization header");
            }
        }

        let request = Self::new(method, url, params)?;
        let (protocol, _) = request.params.partition_protocol();
        for key in protocol.keys() {
            if protocol.get_all(key).count() > 1 {
                return Err(OAuthError::malformed(format!(
                    "protocol parameter '{key}' appears more than once"
                )));
            }
        }
        Ok(request)
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Normalized URL without query string.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Every parameter of the request.
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// First value of a parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Replace a parameter value.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<String>) {
        self.params.set(name, value);
    }

    /// Parameters that are not `oauth_*`.
    pub fn application_parameters(&self) -> Parameters {
        self.params.partition_protocol().1
    }

    /// `oauth_*` parameters, including the signature once signed.
    pub fn protocol_parameters(&self) -> Parameters {
        self.params.partition_protocol().0
    }

    /// Signature base string over every parameter except `oauth_signature`.
    pub fn base_string(&self) -> String {
        signature_base_string(self.method.as_str(), &self.base_url, &self.params)
    }

    /// Set `oauth_signature_method`, compute the signature and store it as
    /// `oauth_signature`.
    ///
    /// # Errors
    ///
    /// Returns the signature method's error if it cannot sign.
    pub fn sign(
        &mut self,
        method: &dyn SignatureMethod,
        consumer: &Consumer,
        token: Option<&Token>,
    ) -> Result<(), OAuthError> {
        self.params.set(OAUTH_SIGNATURE_METHOD, method.name());
        let base_string = self.base_string();
        tracing::debug!(method = method.name(), "signing request");
        let signature = method.sign(&base_string, consumer.secret(), token.map(Token::secret))?;
        self.params.set(OAUTH_SIGNATURE, signature);
        Ok(())
    }

    /// `oauth_signature`, if signed.
    pub fn signature(&self) -> Option<&str> {
        self.params.get(OAUTH_SIGNATURE)
    }

    /// `Authorization` header value carrying only the `oauth_*` parameters.
    pub fn to_header(&self) -> String {
        let mut protocol: Vec<(String, String)> = self.protocol_parameters().into_iter().collect();
        protocol.sort();
        let header_parts: Vec<String> = protocol
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        format!("OAuth {}", header_parts.join(", "))
    }

    /// All parameters, form-encoded.
    pub fn to_post_data(&self) -> String {
        self.params.to_query_string()
    }

    /// Base URL with every parameter in the query string.
    pub fn to_url(&self) -> String {
        with_query(&self.base_url, &self.to_post_data())
    }
}

/// Append a query string to a URL, leaving the URL alone when empty.
pub(crate) fn with_query(base_url: &str, query: &str) -> String {
    if query.is_empty() {
        base_url.to_owned()
    } else {
        format!("{base_url}?{query}")
    }
}

fn is_oauth_scheme(header: &str) -> bool {
    header
        .trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("OAuth "))
}

/// Parse an `Authorization: OAuth k="v", ...` header value.
///
/// Values are percent-decoded. `realm` and non-`oauth_*` entries are dropped.
///
/// # Errors
///
/// Returns [`OAuthError::MalformedParameters`] if the scheme is not `OAuth`
/// or an entry is not `key="value"`.
pub fn parse_authorization_header(header: &str) -> Result<Parameters, OAuthError> {
    if !is_oauth_scheme(header) {
        return Err(OAuthError::malformed("authorization scheme is not OAuth"));
    }
    let mut params = Parameters::new();
    for entry in header.trim_start()[6..].split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| OAuthError::malformed(format!("bad authorization entry '{entry}'")))?;
        let key = key.trim();
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        if key.starts_with("oauth_") {
            params.append(decode(key)?, decode(value)?);
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::signature::HmacSha1;

    #[test]
    fn test_method_from_str() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert!(matches!(
            "PATCH".parse::<HttpMethod>(),
            Err(OAuthError::MalformedParameters(_))
        ));
    }

    #[test]
    fn test_new_merges_query() {
        let request = OAuthRequest::new(
            HttpMethod::Get,
            "https://example.com/r?a=1",
            Parameters::new().with("b", "2"),
        )
        .unwrap();

        assert_eq!(request.base_url(), "https://example.com/r");
        assert_eq!(request.parameter("a"), Some("1"));
        assert_eq!(request.parameter("b"), Some("2"));
    }

    #[test]
    fn test_sign_sets_method_and_signature() {
        let mut request = OAuthRequest::new(
            HttpMethod::Get,
            "https://example.com/r",
            Parameters::new().with("oauth_consumer_key", "ck"),
        )
        .unwrap();
        request.sign(&HmacSha1, &Consumer::new("ck", "cs"), None).unwrap();

        assert_eq!(request.parameter(OAUTH_SIGNATURE_METHOD), Some("HMAC-SHA1"));
        let signature = request.signature().unwrap().to_owned();
        assert!(HmacSha1.verify(&request.base_string(), "cs", None, &signature));
    }

    #[test]
    fn test_header_only_protocol_parameters() {
        let request = OAuthRequest::new(
            HttpMethod::Get,
            "https://example.com/r",
            Parameters::new()
                .with("oauth_nonce", "a b")
                .with("limit", "10")
                .with("oauth_consumer_key", "ck"),
        )
        .unwrap();

        assert_eq!(
            request.to_header(),
            r#"OAuth oauth_consumer_key="ck", oauth_nonce="a%20b""#
        );
    }

    #[test]
    fn test_to_url() {
        let request = OAuthRequest::new(
            HttpMethod::Get,
            "https://example.com/r",
            Parameters::new().with("q", "x&y"),
        )
        .unwrap();

        assert_eq!(request.to_url(), "https://example.com/r?q=x%26y");
    }

    #[test]
    fn test_parse_authorization_header() {
        let params = parse_authorization_header(
            r#"OAuth realm="Example", oauth_consumer_key="ck", oauth_signature="a%2Bb%3D", oauth_nonce=n1"#,
        )
        .unwrap();

        assert_eq!(params.get("oauth_consumer_key"), Some("ck"));
        assert_eq!(params.get("oauth_signature"), Some("a+b="));
        assert_eq!(params.get("oauth_nonce"), Some("n1"));
        assert!(!params.contains("realm"));
    }

    #[test]
    fn test_parse_authorization_header_rejects_other_schemes() {
        assert!(parse_authorization_header("Basic dXNlcjpwYXNz").is_err());
        assert!(parse_authorization_header("OAuth oauth_nonce").is_err());
    }

    #[test]
    fn test_header_round_trip() {
        let request = OAuthRequest::new(
            HttpMethod::Post,
            "https://example.com/r",
            Parameters::new()
                .with("oauth_consumer_key", "c k")
                .with("oauth_signature", "x/y+z="),
        )
        .unwrap();

        let parsed = parse_authorization_header(&request.to_header()).unwrap();

        assert_eq!(parsed.get("oauth_consumer_key"), Some("c k"));
        assert_eq!(parsed.get("oauth_signature"), Some("x/y+z="));
    }

    #[test]
    fn test_from_parts_collects_all_sources() {
        let body = Parameters::new().with("name", "value");
        let request = OAuthRequest::from_parts(
            HttpMethod::Post,
            "https://example.com/r?limit=5",
            Some(r#"OAuth oauth_consumer_key="ck""#),
            Some(&body),
        )
        .unwrap();

        assert_eq!(request.parameter("limit"), Some("5"));
        assert_eq!(request.parameter("name"), Some("value"));
        assert_eq!(request.parameter("oauth_consumer_key"), Some("ck"));
    }

    #[test]
    fn test_from_parts_ignores_basic_auth() {
        let request = OAuthRequest::from_parts(
            HttpMethod::Get,
            "https://example.com/r",
            Some("Basic dXNlcjpwYXNz"),
            None,
        )
        .unwrap();

        assert!(request.parameters().is_empty());
    }

    #[test]
    fn test_from_parts_rejects_duplicate_protocol_parameter() {
        let result = OAuthRequest::from_parts(
            HttpMethod::Get,
            "https://example.com/r?oauth_nonce=a",
            Some(r#"OAuth oauth_nonce="b""#),
            None,
        );

        assert!(matches!(result, Err(OAuthError::MalformedParameters(_))));
    }
}
