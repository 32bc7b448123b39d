//! Context.IO 2.0 REST API client.
//!
//! [`ContextIo`] signs every call with OAuth 1.0 HMAC-SHA1 (via `cio-oauth`)
//! and sends it through a [`Transport`]. Calls scoped to an account use the
//! configured access token; application-level calls are two-legged.
//!
//! # Architecture
//!
//! - [`ApiCall`] describes one request: method, action path, parameters and
//!   body kind (form, JSON or multipart upload)
//! - [`ContextIo::request`] signs it, attaches the body and checks the
//!   [`Response`] status and content type
//! - Endpoint methods (`list_accounts`, `get_message`, `add_webhook`, ...)
//!   validate parameter names with [`filter_params`] and build the action path
//! - [`UreqTransport`] is the blocking HTTP implementation; [`MockTransport`]
//!   records requests for tests (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use cio_client::ContextIo;
//! use cio_config::Config;
//! use cio_oauth::Parameters;
//!
//! let config = Config::load(None, None)?;
//! let client = ContextIo::from_config(&config)?;
//! let accounts = client.list_accounts(&Parameters::new().with("limit", "10"))?;
//! ```

mod client;
mod error;
mod multipart;
mod params;
mod response;
mod transport;
mod types;

pub use client::{ApiCall, ClientConfig, ContextIo, credentials_from_config};
pub use error::ClientError;
pub use multipart::Upload;
pub use params::{FolderChange, MessageFlags, MessageId, filter_params};
pub use response::Response;
#[cfg(any(test, feature = "mock"))]
pub use transport::MockTransport;
pub use transport::{Transport, UreqTransport};
pub use types::{Account, EmailAddress, Source, Success};
