//! File attachment operations.

use cio_oauth::{Parameters, encode};
use serde_json::Value;
use tracing::debug;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};
use crate::response::ANY;

const LIST_PARAMS: &[&str] = &[
    "indexed_before",
    "indexed_after",
    "date_before",
    "date_after",
    "file_name",
    "limit",
    "offset",
    "email",
    "to",
    "from",
    "cc",
    "bcc",
    "group_by_revisions",
    "include_person_info",
    "source",
];

const URI_LIST: &[&str] = &["text/uri-list"];

fn file_path(file_id: &str, sub: Option<&str>) -> Result<String, ClientError> {
    require_arg(file_id, "file_id")?;
    let id = encode(file_id);
    Ok(match sub {
        Some(sub) => format!("files/{id}/{sub}"),
        None => format!("files/{id}"),
    })
}

fn person_info_params(include_person_info: bool) -> Parameters {
    include_person_info
        .then_some(("include_person_info", "1"))
        .into_iter()
        .collect()
}

impl ContextIo {
    /// List files attached to messages of an account.
    pub fn list_files(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, LIST_PARAMS, &[])?;
        self.json(ApiCall::get("files").account(account).params(params))
    }

    /// Get file metadata.
    pub fn get_file(&self, account: &str, file_id: &str) -> Result<Value, ClientError> {
        self.json(ApiCall::get(file_path(file_id, None)?).account(account))
    }

    /// Download file contents.
    pub fn get_file_content(&self, account: &str, file_id: &str) -> Result<Vec<u8>, ClientError> {
        let call = ApiCall::get(file_path(file_id, Some("content"))?)
            .account(account)
            .accept(ANY);
        let bytes = self.request(call)?.into_bytes();
        debug!(file_id, size = bytes.len(), "downloaded file content");
        Ok(bytes)
    }

    /// Temporary public URL of the file contents.
    pub fn get_file_url(&self, account: &str, file_id: &str) -> Result<String, ClientError> {
        let call = ApiCall::get(file_path(file_id, Some("content"))?)
            .account(account)
            .params(Parameters::new().with("as_link", "1"))
            .accept(URI_LIST);
        Ok(self.request(call)?.text().trim().to_owned())
    }

    /// Diff between two revisions of a file.
    ///
    /// `generate` defaults to `true`, asking the server to compute the diff
    /// if it does not have one yet.
    pub fn get_file_changes(
        &self,
        account: &str,
        file_id1: &str,
        file_id2: &str,
        generate: Option<bool>,
    ) -> Result<Value, ClientError> {
        require_arg(file_id2, "file_id2")?;
        let generate = if generate.unwrap_or(true) { "1" } else { "0" };
        let params = Parameters::new()
            .with("file_id", file_id2)
            .with("generate", generate);
        self.json(
            ApiCall::get(file_path(file_id1, Some("changes"))?)
                .account(account)
                .params(params),
        )
    }

    /// Other revisions of a file.
    pub fn list_file_revisions(
        &self,
        account: &str,
        file_id: &str,
        include_person_info: bool,
    ) -> Result<Value, ClientError> {
        self.json(
            ApiCall::get(file_path(file_id, Some("revisions"))?)
                .account(account)
                .params(person_info_params(include_person_info)),
        )
    }

    /// Files related to a file (same name, same thread).
    pub fn list_file_related(
        &self,
        account: &str,
        file_id: &str,
        include_person_info: bool,
    ) -> Result<Value, ClientError> {
        self.json(
            ApiCall::get(file_path(file_id, Some("related"))?)
                .account(account)
                .params(person_info_params(include_person_info)),
        )
    }
}
