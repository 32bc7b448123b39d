//! Contacts of an account and what they exchanged.

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};

const LIST_PARAMS: &[&str] = &[
    "active_after",
    "active_before",
    "limit",
    "offset",
    "search",
    "sort_by",
    "sort_order",
];

const FILES_PARAMS: &[&str] = &[
    "limit",
    "offset",
    "scope",
    "group_by_revisions",
    "include_person_info",
];

const MESSAGES_PARAMS: &[&str] = &[
    "limit",
    "offset",
    "scope",
    "folder",
    "include_person_info",
];

const THREADS_PARAMS: &[&str] = &["limit", "offset", "scope", "folder"];

fn contact_path(email: &str, sub: Option<&str>) -> Result<String, ClientError> {
    require_arg(email, "email")?;
    let email = encode(email);
    Ok(match sub {
        Some(sub) => format!("contacts/{email}/{sub}"),
        None => format!("contacts/{email}"),
    })
}

impl ContextIo {
    /// List contacts.
    pub fn list_contacts(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, LIST_PARAMS, &[])?;
        self.json(ApiCall::get("contacts").account(account).params(params))
    }

    /// Get one contact by email address.
    pub fn get_contact(&self, account: &str, email: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::get(contact_path(email, None)?).account(account))
    }

    /// Files exchanged with a contact.
    pub fn list_contact_files(
        &self,
        account: &str,
        email: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        self.contact_list(account, email, "files", FILES_PARAMS, params)
    }

    /// Messages exchanged with a contact.
    pub fn list_contact_messages(
        &self,
        account: &str,
        email: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        self.contact_list(account, email, "messages", MESSAGES_PARAMS, params)
    }

    /// Threads involving a contact.
    pub fn list_contact_threads(
        &self,
        account: &str,
        email: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        self.contact_list(account, email, "threads", THREADS_PARAMS, params)
    }

    fn contact_list(
        &self,
        account: &str,
        email: &str,
        sub: &str,
        valid: &[&str],
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, valid, &[])?;
        self.json(
            ApiCall::get(contact_path(email, Some(sub))?)
                .account(account)
                .params(params),
        )
    }
}
