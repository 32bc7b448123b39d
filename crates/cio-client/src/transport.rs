//! HTTP transport behind the API client.

use std::sync::Arc;
use std::time::Duration;

use cio_oauth::{HttpMethod, SignedRequest};
use ureq::{Agent, RequestBuilder};

use crate::error::ClientError;
use crate::response::Response;

/// Sends signed requests.
///
/// The client never inspects connections; implementations only move bytes.
/// Error statuses are returned as responses, not errors.
pub trait Transport: Send + Sync {
    /// Send `request` and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] for network failures and timeouts.
    fn send(&self, request: &SignedRequest) -> Result<Response, ClientError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: &SignedRequest) -> Result<Response, ClientError> {
        (**self).send(request)
    }
}

/// Blocking transport on a shared `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    /// Create a transport with a global per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

fn with_headers<B>(
    mut builder: RequestBuilder<B>,
    headers: &[(String, String)],
) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}

impl Transport for UreqTransport {
    fn send(&self, request: &SignedRequest) -> Result<Response, ClientError> {
        let url = request.url.as_str();
        let body = request.body.as_deref().unwrap_or_default();

        let response = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), &request.headers).call()?,
            HttpMethod::Delete => with_headers(self.agent.delete(url), &request.headers).call()?,
            HttpMethod::Post => with_headers(self.agent.post(url), &request.headers).send(body)?,
            HttpMethod::Put => with_headers(self.agent.put(url), &request.headers).send(body)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect();
        let body = response.into_body().read_to_vec()?;

        Ok(Response::new(status, headers, body))
    }
}

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{ClientError, Response, SignedRequest, Transport};

    /// Transport that records requests and replays queued responses.
    ///
    /// When the queue is empty every request gets `200` with `{}`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let transport = MockTransport::new().with_json(200, r#"[{"id":"a1"}]"#);
    /// ```
    #[derive(Debug, Default)]
    pub struct MockTransport {
        requests: Mutex<Vec<SignedRequest>>,
        responses: Mutex<VecDeque<Response>>,
    }

    impl MockTransport {
        /// Create a mock with no queued responses.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a JSON response.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned.
        #[must_use]
        pub fn with_json(self, status: u16, body: &str) -> Self {
            self.with_response(Response::new(
                status,
                vec![("Content-Type".to_owned(), "application/json".to_owned())],
                body,
            ))
        }

        /// Queue a response.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned.
        #[must_use]
        pub fn with_response(self, response: Response) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        /// Requests sent so far.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned.
        pub fn requests(&self) -> Vec<SignedRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// The most recent request.
        ///
        /// # Panics
        ///
        /// Panics if no request was sent or the internal lock is poisoned.
        pub fn last_request(&self) -> SignedRequest {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request sent")
        }
    }

    impl Transport for MockTransport {
        fn send(&self, request: &SignedRequest) -> Result<Response, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Response::new(
                        200,
                        vec![("Content-Type".to_owned(), "application/json".to_owned())],
                        "{}",
                    )
                }))
        }
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
