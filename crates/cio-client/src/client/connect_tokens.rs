//! Connect tokens, at application level or for an existing account.

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};

const ADD_PARAMS: &[&str] = &[
    "service_level",
    "email",
    "callback_url",
    "first_name",
    "last_name",
    "source_expunge_on_deleted_flag",
    "source_sync_all_folders",
    "source_callback_url",
    "source_sync_flags",
    "source_raw_file_list",
];

/// Scope `call` to `account` when one is given.
fn scoped(call: ApiCall, account: Option<&str>) -> ApiCall {
    match account {
        Some(account) => call.account(account),
        None => call,
    }
}

impl ContextIo {
    /// List connect tokens of the application, or of `account`.
    pub fn list_connect_tokens(&self, account: Option<&str>) -> Result<Value, ClientError> {
        self.json(scoped(ApiCall::get("connect_tokens"), account))
    }

    /// Get one connect token.
    pub fn get_connect_token(
        &self,
        account: Option<&str>,
        token: &str,
    ) -> Result<Value, ClientError> {
        require_arg(token, "token")?;
        let call = ApiCall::get(format!("connect_tokens/{}", encode(token)));
        self.json(scoped(call, account))
    }

    /// Create a connect token. `callback_url` is required.
    pub fn add_connect_token(
        &self,
        account: Option<&str>,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, ADD_PARAMS, &["callback_url"])?;
        let call = ApiCall::post("connect_tokens").params(params);
        self.json(scoped(call, account))
    }

    /// Delete a connect token.
    pub fn delete_connect_token(
        &self,
        account: Option<&str>,
        token: &str,
    ) -> Result<Value, ClientError> {
        require_arg(token, "token")?;
        let call = ApiCall::delete(format!("connect_tokens/{}", encode(token)));
        self.json(scoped(call, account))
    }
}
