//! Gmail thread operations.

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::messages::folder_change_call;
use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{FolderChange, filter_params, gmail_id, require_arg};

const LIST_PARAMS: &[&str] = &[
    "subject",
    "indexed_after",
    "indexed_before",
    "active_after",
    "active_before",
    "started_after",
    "started_before",
    "limit",
    "offset",
    "email",
    "to",
    "from",
    "cc",
    "bcc",
    "folder",
];

const GET_PARAMS: &[&str] = &[
    "include_body",
    "include_headers",
    "include_flags",
    "type",
    "include_person_info",
    "limit",
    "offset",
];

fn thread_path(gmail_thread_id: &str) -> Result<String, ClientError> {
    require_arg(gmail_thread_id, "gmail_thread_id")?;
    Ok(format!("threads/{}", encode(&gmail_id(gmail_thread_id))))
}

impl ContextIo {
    /// List threads of an account.
    pub fn list_threads(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, LIST_PARAMS, &[])?;
        self.json(ApiCall::get("threads").account(account).params(params))
    }

    /// Get a thread by Gmail thread id (`gm-` prefix optional).
    ///
    /// Use [`get_message_thread`](Self::get_message_thread) to look a
    /// thread up by one of its messages.
    pub fn get_thread(
        &self,
        account: &str,
        gmail_thread_id: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, GET_PARAMS, &[])?;
        self.json(
            ApiCall::get(thread_path(gmail_thread_id)?)
                .account(account)
                .params(params),
        )
    }

    /// Delete a thread.
    pub fn delete_thread(
        &self,
        account: &str,
        gmail_thread_id: &str,
    ) -> Result<Value, ClientError> {
        let call = ApiCall::delete(thread_path(gmail_thread_id)?).account(account);
        self.json(call)
    }

    /// Change the folders of every message in a thread.
    pub fn set_thread_folders(
        &self,
        account: &str,
        gmail_thread_id: &str,
        change: &FolderChange,
    ) -> Result<Value, ClientError> {
        let action = format!("{}/folders", thread_path(gmail_thread_id)?);
        self.json(folder_change_call(action, change)?.account(account))
    }
}
