//! Signature base string construction (RFC 5849 Section 3.4.1).

use url::Url;

use crate::error::OAuthError;
use crate::params::{Parameters, encode};

/// Parameter never included in the base string.
pub(crate) const OAUTH_SIGNATURE: &str = "oauth_signature";

/// Normalized request URL split from its query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// `scheme://host[:port]/path`, scheme and host lower-cased, default port omitted.
    pub base_url: String,
    /// Parameters found in the URL query string.
    pub query: Parameters,
}

/// Split a request URL into its base string URI and query parameters.
///
/// Scheme and host are lower-cased and default ports (80 for http, 443 for
/// https) dropped. Path case is preserved. The fragment is discarded.
///
/// # Errors
///
/// Returns [`OAuthError::MalformedParameters`] if the URL cannot be parsed,
/// has no host, or is not http/https.
pub fn normalize_url(url: &str) -> Result<NormalizedUrl, OAuthError> {
    let parsed =
        Url::parse(url).map_err(|e| OAuthError::malformed(format!("invalid URL '{url}': {e}")))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(OAuthError::malformed(format!(
            "unsupported URL scheme '{scheme}'"
        )));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| OAuthError::malformed(format!("URL has no host: '{url}'")))?;

    // `Url::port` is None when the port is the scheme default
    let authority = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };
    let path = match parsed.path() {
        "" => "/",
        path => path,
    };

    let query = match parsed.query() {
        Some(q) => Parameters::parse(q)?,
        None => Parameters::new(),
    };

    Ok(NormalizedUrl {
        base_url: format!("{scheme}://{authority}{path}"),
        query,
    })
}

/// Build the normalized parameter string.
///
/// Keys and values are encoded individually, then pairs are sorted by
/// encoded key and encoded value. The sort is stable so identical pairs keep
/// their relative order. `oauth_signature` is excluded.
pub fn normalize_parameters(params: &Parameters) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter(|(k, _)| *k != OAUTH_SIGNATURE)
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build OAuth signature base string.
///
/// Format: `HTTP_METHOD&encoded_base_url&encoded_parameters`
pub fn signature_base_string(method: &str, base_url: &str, params: &Parameters) -> String {
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        encode(base_url),
        encode(&normalize_parameters(params))
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normalize_url_lowercases_scheme_and_host() {
        let url = normalize_url("HTTPS://API.Example.COM/2.0/Accounts").unwrap();

        assert_eq!(url.base_url, "https://api.example.com/2.0/Accounts");
        assert!(url.query.is_empty());
    }

    #[test]
    fn test_normalize_url_drops_default_ports() {
        assert_eq!(
            normalize_url("https://example.com:443/r").unwrap().base_url,
            "https://example.com/r"
        );
        assert_eq!(
            normalize_url("http://example.com:80/r").unwrap().base_url,
            "http://example.com/r"
        );
    }

    #[test]
    fn test_normalize_url_keeps_other_ports() {
        assert_eq!(
            normalize_url("http://example.com:8080/r").unwrap().base_url,
            "http://example.com:8080/r"
        );
        assert_eq!(
            normalize_url("https://example.com:80/r").unwrap().base_url,
            "https://example.com:80/r"
        );
    }

    #[test]
    fn test_normalize_url_splits_query() {
        let url = normalize_url("https://example.com/r?b=2&a=1&a=3#frag").unwrap();

        assert_eq!(url.base_url, "https://example.com/r");
        assert_eq!(url.query.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
        assert_eq!(url.query.get("b"), Some("2"));
    }

    #[test]
    fn test_normalize_url_empty_path() {
        assert_eq!(
            normalize_url("https://example.com").unwrap().base_url,
            "https://example.com/"
        );
    }

    #[test]
    fn test_normalize_url_rejects_garbage() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(OAuthError::MalformedParameters(_))
        ));
        assert!(matches!(
            normalize_url("ftp://example.com/file"),
            Err(OAuthError::MalformedParameters(_))
        ));
    }

    #[test]
    fn test_normalize_parameters_order_independent() {
        let a = Parameters::new()
            .with("b", "2")
            .with("a", "1")
            .with("c", "x y");
        let b = Parameters::new()
            .with("c", "x y")
            .with("a", "1")
            .with("b", "2");

        assert_eq!(normalize_parameters(&a), normalize_parameters(&b));
        assert_eq!(normalize_parameters(&a), "a=1&b=2&c=x%20y");
    }

    #[test]
    fn test_normalize_parameters_multi_valued() {
        let mut params = Parameters::new();
        params.append_all("tag", ["b", "a"]);

        assert_eq!(normalize_parameters(&params), "tag=a&tag=b");
    }

    #[test]
    fn test_normalize_parameters_sorts_on_encoded_form() {
        // '%' (0x25) sorts before 'A', so an encoded space key comes first
        let params = Parameters::new().with("A", "1").with(" ", "2");

        assert_eq!(normalize_parameters(&params), "%20=2&A=1");
    }

    #[test]
    fn test_normalize_parameters_excludes_signature() {
        let params = Parameters::new()
            .with("oauth_signature", "sig")
            .with("oauth_nonce", "n");

        assert_eq!(normalize_parameters(&params), "oauth_nonce=n");
    }

    /// Worked example from RFC 5849 Section 3.4.1.3.2.
    #[test]
    fn test_rfc5849_normalized_parameters() {
        let url = normalize_url("https://example.com/request?b5=%3D%253D&a3=a&c%40=&a2=r%20b")
            .unwrap();
        let mut params = url.query;
        params.extend(Parameters::parse("c2&a3=2+q").unwrap());
        params.append("oauth_consumer_key", "9djdj82h48djs9d2");
        params.append("oauth_token", "kkk9d7dh3k39sjv7");
        params.append("oauth_signature_method", "HMAC-SHA1");
        params.append("oauth_timestamp", "137131201");
        params.append("oauth_nonce", "7d8f3e4a");

        assert_eq!(
            normalize_parameters(&params),
            "a2=r%20b&a3=2%20q&a3=a&b5=%3D%253D&c%40=&c2=&oauth_consumer_key=9djdj82h48djs9d2\
             &oauth_nonce=7d8f3e4a&oauth_signature_method=HMAC-SHA1&oauth_timestamp=137131201\
             &oauth_token=kkk9d7dh3k39sjv7"
        );
    }

    #[test]
    fn test_signature_base_string() {
        let params = Parameters::new()
            .with("oauth_consumer_key", "test_key")
            .with("oauth_nonce", "123456");

        let base = signature_base_string("get", "https://example.com/api", &params);

        assert_eq!(
            base,
            "GET&https%3A%2F%2Fexample.com%2Fapi&oauth_consumer_key%3Dtest_key%26oauth_nonce%3D123456"
        );
    }
}
