//! Webhooks for one account or for the whole application.

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};

const ACCOUNT_PARAMS: &[&str] = &[
    "filter_to",
    "filter_from",
    "filter_cc",
    "filter_subject",
    "filter_thread",
    "filter_new_important",
    "filter_file_name",
    "filter_file_revisions",
    "sync_period",
    "callback_url",
    "failure_notif_url",
    "filter_folder_added",
    "filter_folder_removed",
    "filter_to_domain",
    "filter_from_domain",
    "filter_parsed_receipts",
    "include_body",
    "body_type",
];

/// Application webhooks accept everything account webhooks do, plus these.
const APPLICATION_EXTRA_PARAMS: &[&str] = &[
    "include_header",
    "receive_all_changes",
    "receive_historical",
];

fn application_params() -> Vec<&'static str> {
    ACCOUNT_PARAMS
        .iter()
        .chain(APPLICATION_EXTRA_PARAMS)
        .copied()
        .collect()
}

fn webhook_path(webhook_id: &str) -> Result<String, ClientError> {
    require_arg(webhook_id, "webhook_id")?;
    Ok(format!("webhooks/{}", encode(webhook_id)))
}

impl ContextIo {
    /// List webhooks of an account.
    pub fn list_webhooks(&self, account: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::get("webhooks").account(account))
    }

    /// Get one account webhook.
    pub fn get_webhook(&self, account: &str, webhook_id: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::get(webhook_path(webhook_id)?).account(account))
    }

    /// Create an account webhook. `callback_url` and `failure_notif_url` are
    /// required.
    pub fn add_webhook(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(
            params,
            ACCOUNT_PARAMS,
            &["callback_url", "failure_notif_url"],
        )?;
        self.json(ApiCall::post("webhooks").account(account).params(params))
    }

    /// Activate or deactivate an account webhook.
    pub fn modify_webhook(
        &self,
        account: &str,
        webhook_id: &str,
        active: bool,
    ) -> Result<Value, ClientError> {
        let params = Parameters::new().with("active", if active { "1" } else { "0" });
        self.json(
            ApiCall::post(webhook_path(webhook_id)?)
                .account(account)
                .params(params),
        )
    }

    /// Delete an account webhook.
    pub fn delete_webhook(&self, account: &str, webhook_id: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::delete(webhook_path(webhook_id)?).account(account))
    }

    /// List application-level webhooks.
    pub fn list_application_webhooks(&self) -> Result<Value, ClientError> {
        self.json(ApiCall::get("webhooks"))
    }

    /// Get one application-level webhook.
    pub fn get_application_webhook(&self, webhook_id: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::get(webhook_path(webhook_id)?))
    }

    /// Create an application-level webhook. `callback_url` is required.
    pub fn add_application_webhook(&self, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, &application_params(), &["callback_url"])?;
        self.json(ApiCall::post("webhooks").params(params))
    }

    /// Change an application-level webhook.
    pub fn modify_application_webhook(
        &self,
        webhook_id: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, &application_params(), &[])?;
        self.json(ApiCall::post(webhook_path(webhook_id)?).params(params))
    }

    /// Delete an application-level webhook.
    pub fn delete_application_webhook(&self, webhook_id: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::delete(webhook_path(webhook_id)?))
    }
}
