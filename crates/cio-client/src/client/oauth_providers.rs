//! OAuth providers used for mailbox access (e.g. Google).

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};

const ADD_PARAMS: &[&str] = &["type", "provider_consumer_key", "provider_consumer_secret"];

impl ContextIo {
    /// List configured OAuth providers.
    pub fn list_oauth_providers(&self) -> Result<Value, ClientError> {
        self.json(ApiCall::get("oauth_providers"))
    }

    /// Get a provider by its consumer key.
    pub fn get_oauth_provider(&self, provider_consumer_key: &str) -> Result<Value, ClientError> {
        require_arg(provider_consumer_key, "provider_consumer_key")?;
        self.json(ApiCall::get(format!(
            "oauth_providers/{}",
            encode(provider_consumer_key)
        )))
    }

    /// Add a provider. `type`, `provider_consumer_key` and
    /// `provider_consumer_secret` are all required.
    pub fn add_oauth_provider(&self, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, ADD_PARAMS, ADD_PARAMS)?;
        self.json(ApiCall::post("oauth_providers").params(params))
    }

    /// Remove a provider.
    pub fn delete_oauth_provider(&self, provider_consumer_key: &str) -> Result<Value, ClientError> {
        require_arg(provider_consumer_key, "provider_consumer_key")?;
        self.json(ApiCall::delete(format!(
            "oauth_providers/{}",
            encode(provider_consumer_key)
        )))
    }
}
