//! Mail sources of an account, their sync state and folders.

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};

const LIST_PARAMS: &[&str] = &["status_ok", "status"];

const ADD_PARAMS: &[&str] = &[
    "type",
    "email",
    "server",
    "username",
    "provider_consumer_key",
    "provider_token",
    "provider_token_secret",
    "provider_refresh_token",
    "service_level",
    "sync_period",
    "sync_all_folders",
    "origin_ip",
    "sync_folders",
    "password",
    "use_ssl",
    "port",
    "callback_url",
    "expunge_on_deleted_flag",
];

const MODIFY_PARAMS: &[&str] = &[
    "provider_token",
    "provider_token_secret",
    "provider_refresh_token",
    "password",
    "provider_consumer_key",
    "mailboxes",
    "expunge_on_deleted_flag",
    "sync_all_folders",
    "service_level",
    "sync_period",
];

const FOLDER_LIST_PARAMS: &[&str] = &["include_extended_counts", "no_cache"];

/// `sources/{label}` with the label encoded.
pub(super) fn source_path(label: &str) -> Result<String, ClientError> {
    require_arg(label, "label")?;
    Ok(format!("sources/{}", encode(label)))
}

/// `sources/{label}/folders/{folder}` with both encoded.
pub(super) fn folder_path(label: &str, folder: &str) -> Result<String, ClientError> {
    require_arg(folder, "folder")?;
    let source = source_path(label)?;
    Ok(format!("{source}/folders/{}", encode(folder)))
}

impl ContextIo {
    /// List sources of an account.
    pub fn list_sources(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, LIST_PARAMS, &[])?;
        self.json(ApiCall::get("sources").account(account).params(params))
    }

    /// Get one source.
    pub fn get_source(&self, account: &str, label: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::get(source_path(label)?).account(account))
    }

    /// Add an IMAP source. `server` and `username` are required; `type`
    /// defaults to `imap`.
    pub fn add_source(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let mut params = filter_params(params, ADD_PARAMS, &["server", "username"])?;
        if !params.contains("type") {
            params.append("type", "imap");
        }
        self.json(ApiCall::post("sources").account(account).params(params))
    }

    /// Change source credentials or sync settings.
    pub fn modify_source(
        &self,
        account: &str,
        label: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, MODIFY_PARAMS, &[])?;
        let call = ApiCall::post(source_path(label)?)
            .account(account)
            .params(params);
        self.json(call)
    }

    /// Clear an error status so the source is retried.
    ///
    /// With `force` the server re-checks the connection immediately.
    pub fn reset_source_status(
        &self,
        account: &str,
        label: &str,
        force: bool,
    ) -> Result<Value, ClientError> {
        let params = if force {
            Parameters::new().with("force_status_check", "1")
        } else {
            Parameters::new().with("status", "1")
        };
        let call = ApiCall::post(source_path(label)?)
            .account(account)
            .params(params);
        self.json(call)
    }

    /// Delete a source.
    pub fn delete_source(&self, account: &str, label: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::delete(source_path(label)?).account(account))
    }

    /// Trigger a sync of one source, or of every source when `label` is `None`.
    pub fn sync_source(&self, account: &str, label: Option<&str>) -> Result<Value, ClientError> {
        self.json(ApiCall::post(sync_path(label)?).account(account))
    }

    /// Sync status of one source, or of every source when `label` is `None`.
    pub fn get_sync(&self, account: &str, label: Option<&str>) -> Result<Value, ClientError> {
        self.json(ApiCall::get(sync_path(label)?).account(account))
    }

    /// List folders of a source.
    pub fn list_source_folders(
        &self,
        account: &str,
        label: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, FOLDER_LIST_PARAMS, &[])?;
        let action = format!("{}/folders", source_path(label)?);
        self.json(ApiCall::get(action).account(account).params(params))
    }

    /// Get one folder of a source.
    pub fn get_source_folder(
        &self,
        account: &str,
        label: &str,
        folder: &str,
    ) -> Result<Value, ClientError> {
        self.json(ApiCall::get(folder_path(label, folder)?).account(account))
    }

    /// Create a folder. `delim` is the hierarchy delimiter used in `folder`.
    pub fn add_folder_to_source(
        &self,
        account: &str,
        label: &str,
        folder: &str,
        delim: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params: Parameters = delim.map(|d| ("delim", d)).into_iter().collect();
        self.json(
            ApiCall::put(folder_path(label, folder)?)
                .account(account)
                .params(params),
        )
    }

    /// Delete a folder.
    pub fn delete_folder_from_source(
        &self,
        account: &str,
        label: &str,
        folder: &str,
        delim: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params: Parameters = delim.map(|d| ("delim", d)).into_iter().collect();
        self.json(
            ApiCall::delete(folder_path(label, folder)?)
                .account(account)
                .params(params),
        )
    }
}

fn sync_path(label: Option<&str>) -> Result<String, ClientError> {
    match label {
        Some(label) => Ok(format!("{}/sync", source_path(label)?)),
        None => Ok("sync".to_owned()),
    }
}
