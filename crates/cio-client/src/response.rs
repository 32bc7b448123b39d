//! HTTP responses returned by the transport.

use serde::de::DeserializeOwned;

use crate::error::ClientError;

/// Content types accepted by JSON endpoints.
pub(crate) const JSON: &[&str] = &["application/json"];

/// Accept any content type.
pub(crate) const ANY: &[&str] = &[];

/// Raw API response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in wire order.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Media type of the body without parameters, lower-cased.
    pub fn content_type(&self) -> Option<String> {
        self.header("Content-Type").map(|value| {
            value
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as UTF-8 text, lossy.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Json`] if the body does not decode into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Consume the response, returning the body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Reject error statuses and unexpected content types.
    ///
    /// An empty `accepted` list accepts any content type.
    pub(crate) fn ensure(self, accepted: &[&str]) -> Result<Self, ClientError> {
        if !self.is_success() {
            return Err(ClientError::HttpResponse {
                status: self.status,
                body: self.text(),
            });
        }

        if !accepted.is_empty() {
            let content_type = self.content_type().unwrap_or_default();
            let accepts = |a: &&str| a.eq_ignore_ascii_case(&content_type);
            if !accepted.iter().any(accepts) {
                return Err(ClientError::UnexpectedContentType {
                    content_type,
                    expected: accepted.iter().map(|a| (*a).to_owned()).collect(),
                });
            }
        }

        Ok(self)
    }
}
