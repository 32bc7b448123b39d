//! Multi-valued request parameters and RFC 3986 percent-encoding.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};

use crate::error::OAuthError;

/// OAuth unreserved characters: A-Z a-z 0-9 - . _ ~
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode string per RFC 3986 (space becomes `%20`).
pub fn encode(input: &str) -> String {
    percent_encode(input.as_bytes(), OAUTH_ENCODE_SET).to_string()
}

/// Decode a percent-encoded string, treating `+` as a space.
///
/// # Errors
///
/// Returns [`OAuthError::MalformedParameters`] if the decoded bytes are not UTF-8.
pub fn decode(input: &str) -> Result<String, OAuthError> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| OAuthError::malformed(format!("invalid UTF-8 in '{input}': {e}")))
}

/// Ordered multi-valued parameter list.
///
/// A key may appear any number of times; insertion order is kept. This is
/// the shape of both query strings and array-valued form fields
/// (`tag=a&tag=b`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    pairs: Vec<(String, String)>,
}

impl Parameters {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string or form body (`a=1&b=2`).
    ///
    /// Keys and values are percent-decoded; `+` decodes to a space. A pair
    /// without `=` gets an empty value. Empty segments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MalformedParameters`] on invalid UTF-8 after decoding.
    pub fn parse(query: &str) -> Result<Self, OAuthError> {
        let mut params = Self::new();
        for segment in query.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            params.append(decode(key)?, decode(value)?);
        }
        Ok(params)
    }

    /// Append a value, keeping existing values for the key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Append one entry per value (array-valued field).
    pub fn append_all<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.append(key, value);
        }
    }

    /// Builder form of [`append`](Self::append).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.append(key, value);
        self
    }

    /// Replace all values of `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.remove(&key);
        self.pairs.push((key, value.into()));
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` has at least one value.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Remove every value for `key`, returning the first removed value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let mut removed = None;
        self.pairs.retain(|(k, v)| {
            if k == key {
                if removed.is_none() {
                    removed = Some(v.clone());
                }
                false
            } else {
                true
            }
        });
        removed
    }

    /// Append every pair of `other`.
    pub fn extend(&mut self, other: Parameters) {
        self.pairs.extend(other.pairs);
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !keys.contains(&k.as_str()) {
                keys.push(k);
            }
        }
        keys
    }

    /// Number of pairs (a multi-valued key counts once per value).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Split into `oauth_*` protocol parameters and everything else.
    #[must_use]
    pub fn partition_protocol(&self) -> (Parameters, Parameters) {
        let (protocol, application): (Vec<_>, Vec<_>) = self
            .pairs
            .iter()
            .cloned()
            .partition(|(k, _)| k.starts_with("oauth_"));
        (
            Parameters { pairs: protocol },
            Parameters { pairs: application },
        )
    }

    /// Encode as `k=v&k=v` with RFC 3986 encoding, in insertion order.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Parameters {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_unreserved() {
        assert_eq!(encode("abc123"), "abc123");
        assert_eq!(encode("ABC"), "ABC");
        assert_eq!(encode("-._~"), "-._~");
    }

    #[test]
    fn test_encode_reserved() {
        assert_eq!(encode(" "), "%20");
        assert_eq!(encode("&"), "%26");
        assert_eq!(encode("="), "%3D");
        assert_eq!(encode("/"), "%2F");
        assert_eq!(encode("+"), "%2B");
        assert_eq!(encode("*"), "%2A");
    }

    #[test]
    fn test_encode_utf8_uppercase_hex() {
        assert_eq!(encode("é"), "%C3%A9");
    }

    #[test]
    fn test_decode_plus_and_percent() {
        assert_eq!(decode("a+b%20c").unwrap(), "a b c");
        assert_eq!(decode("%2B").unwrap(), "+");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        assert!(matches!(
            decode("%FF"),
            Err(OAuthError::MalformedParameters(_))
        ));
    }

    #[test]
    fn test_parse_multi_valued() {
        let params = Parameters::parse("tag=a&tag=b&limit=10&flag").unwrap();

        assert_eq!(params.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(params.get("limit"), Some("10"));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut params = Parameters::new().with("a", "1").with("a", "2");
        params.set("a", "3");

        assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn test_remove_returns_first() {
        let mut params = Parameters::new()
            .with("a", "1")
            .with("b", "x")
            .with("a", "2");

        assert_eq!(params.remove("a"), Some("1".to_owned()));
        assert!(!params.contains("a"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_partition_protocol() {
        let params = Parameters::new()
            .with("oauth_nonce", "n")
            .with("limit", "5")
            .with("oauth_token", "t");
        let (protocol, application) = params.partition_protocol();

        assert_eq!(protocol.keys(), vec!["oauth_nonce", "oauth_token"]);
        assert_eq!(application.keys(), vec!["limit"]);
    }

    #[test]
    fn test_to_query_string_keeps_order() {
        let params = Parameters::new().with("b", "x y").with("a", "1&2");

        assert_eq!(params.to_query_string(), "b=x%20y&a=1%262");
    }
}
