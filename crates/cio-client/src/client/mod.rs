//! Context.IO 2.0 REST API client.
//!
//! Provides a sync HTTP client with OAuth 1.0 HMAC-SHA1 authentication.
//! Endpoint groups live in submodules; each adds methods to [`ContextIo`].

mod accounts;
mod connect_tokens;
mod contacts;
mod discovery;
mod files;
mod messages;
mod oauth_providers;
mod sources;
mod threads;
mod webhooks;

use std::time::Duration;

use cio_config::Config;
use cio_oauth::{
    AuthMode, Consumer, Credentials, HttpMethod, Parameters, Signer, SigningRequest, Token, encode,
};
use serde_json::Value;
use tracing::info;

use crate::error::ClientError;
use crate::multipart::{self, Upload};
use crate::params::check_account_id;
use crate::response::{JSON, Response};
use crate::transport::{Transport, UreqTransport};

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Connection settings for [`ContextIo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API host, without scheme.
    pub endpoint: String,
    /// API version path segment.
    pub version: String,
    /// Use `https`.
    pub ssl: bool,
    /// How OAuth parameters are transmitted.
    pub auth_mode: AuthMode,
    /// Global per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "api.context.io".to_owned(),
            version: cio_config::SUPPORTED_API_VERSION.to_owned(),
            ssl: true,
            auth_mode: AuthMode::Header,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            user_agent: concat!("cio-client/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl ClientConfig {
    /// Build from the `[api]` section of a loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        let auth_mode = match config.api.auth_mode {
            cio_config::AuthMode::Header => AuthMode::Header,
            cio_config::AuthMode::Query => AuthMode::Query,
            cio_config::AuthMode::Url => AuthMode::Url,
        };
        Self {
            endpoint: config.api.endpoint.clone(),
            version: config.api.version.clone(),
            ssl: config.api.ssl,
            auth_mode,
            timeout: Duration::from_secs(config.api.timeout_secs),
            ..Self::default()
        }
    }

    /// `{http|https}://{endpoint}/{version}/`.
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}/{}/", self.endpoint, self.version)
    }
}

/// Request body of an [`ApiCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    /// Parameters are signed and sent per the auth mode.
    Form,
    /// Raw JSON body, sent unsigned.
    Json(Vec<u8>),
    /// Parameters as unsigned form fields followed by a file part.
    Multipart(Upload),
}

/// One API request.
///
/// `action` is relative to the version root, e.g. `accounts` or
/// `messages/abc/flags`. With an account set the request goes to
/// `accounts/{id}/{action}` and is signed with the access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    method: HttpMethod,
    account: Option<String>,
    action: String,
    params: Parameters,
    body: Body,
    accept: &'static [&'static str],
}

impl ApiCall {
    /// Create a call expecting a JSON response.
    pub fn new(method: HttpMethod, action: impl Into<String>) -> Self {
        Self {
            method,
            account: None,
            action: action.into(),
            params: Parameters::new(),
            body: Body::Form,
            accept: JSON,
        }
    }

    /// `GET` call.
    pub fn get(action: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, action)
    }

    /// `POST` call.
    pub fn post(action: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, action)
    }

    /// `PUT` call.
    pub fn put(action: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, action)
    }

    /// `DELETE` call.
    pub fn delete(action: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, action)
    }

    /// Scope the call to an account.
    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Application parameters.
    #[must_use]
    pub fn params(mut self, params: Parameters) -> Self {
        self.params = params;
        self
    }

    /// Send a JSON body instead of form parameters.
    #[must_use]
    pub fn json_body(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Send parameters and a file as `multipart/form-data`.
    #[must_use]
    pub fn upload(mut self, upload: Upload) -> Self {
        self.body = Body::Multipart(upload);
        self
    }

    /// Response content types to accept. Empty accepts anything.
    #[must_use]
    pub fn accept(mut self, content_types: &'static [&'static str]) -> Self {
        self.accept = content_types;
        self
    }
}

/// Context.IO REST API client.
pub struct ContextIo {
    config: ClientConfig,
    signer: Signer,
    transport: Box<dyn Transport>,
}

impl ContextIo {
    /// Create a client using the `ureq` transport.
    pub fn new(config: ClientConfig, credentials: Credentials) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, credentials, transport)
    }

    /// Create a client with a custom transport.
    pub fn with_transport(
        config: ClientConfig,
        credentials: Credentials,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            config,
            signer: Signer::new(credentials),
            transport: Box::new(transport),
        }
    }

    /// Create client from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the `[credentials]` section is
    /// missing or invalid.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let credentials = credentials_from_config(config)?;
        Ok(Self::new(ClientConfig::from_config(config), credentials))
    }

    /// Connection settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credentials used for signing.
    pub fn credentials(&self) -> &Credentials {
        self.signer.credentials()
    }

    /// Sign and send a call, returning the checked response.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidArgument`] for a bad account id,
    /// [`ClientError::OAuth`] if signing fails, [`ClientError::Transport`] for
    /// network failures, [`ClientError::HttpResponse`] for non-2xx statuses and
    /// [`ClientError::UnexpectedContentType`] for a content type the call does
    /// not accept.
    pub fn request(&self, call: ApiCall) -> Result<Response, ClientError> {
        let (action, signer) = match &call.account {
            Some(account) => {
                check_account_id(account)?;
                let action = format!("accounts/{}/{}", encode(account), call.action);
                (action.trim_end_matches('/').to_owned(), self.signer.clone())
            }
            None => (call.action.clone(), self.signer.without_token()),
        };
        let url = format!("{}{action}", self.config.base_url());

        let mut signed = match call.body {
            Body::Form => signer.sign(
                SigningRequest::new(call.method, url).params(call.params),
                self.config.auth_mode,
            )?,
            Body::Json(json) => {
                if !call.params.is_empty() {
                    return Err(ClientError::invalid(
                        "parameters cannot be combined with a JSON body",
                    ));
                }
                let mut signed =
                    signer.sign(SigningRequest::new(call.method, url), self.config.auth_mode)?;
                signed.push_header("Content-Type", "application/json");
                signed.body = Some(json);
                signed
            }
            Body::Multipart(upload) => {
                let mut signed =
                    signer.sign(SigningRequest::new(call.method, url), self.config.auth_mode)?;
                let multipart = multipart::encode(&call.params, &upload);
                signed.push_header("Content-Type", multipart.content_type);
                signed.body = Some(multipart.body);
                signed
            }
        };
        signed.push_header("User-Agent", self.config.user_agent.as_str());

        info!(method = %call.method, action = %action, "calling Context.IO API");
        let response = self.transport.send(&signed)?;
        response.ensure(call.accept)
    }

    /// Send a call and decode the JSON response.
    pub(crate) fn json(&self, call: ApiCall) -> Result<Value, ClientError> {
        self.request(call)?.json()
    }
}

/// Signing credentials from the `[credentials]` section.
///
/// # Errors
///
/// Returns [`ClientError::Config`] if the section is missing or invalid.
pub fn credentials_from_config(config: &Config) -> Result<Credentials, ClientError> {
    let section = config.require_credentials()?;
    let consumer = Consumer::new(&section.consumer_key, &section.consumer_secret);
    Ok(match section.access_token() {
        Some((key, secret)) => Credentials::with_token(consumer, Token::new(key, secret)),
        None => Credentials::consumer_only(consumer),
    })
}
