//! Message listing, retrieval and mutation.

use cio_oauth::{Parameters, encode};
use serde_json::Value;

use super::sources::folder_path;
use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::multipart::Upload;
use crate::params::{FolderChange, MessageFlags, MessageId, filter_params, require_arg};
use crate::response::ANY;

const LIST_PARAMS: &[&str] = &[
    "subject",
    "date_before",
    "date_after",
    "indexed_after",
    "indexed_before",
    "limit",
    "offset",
    "email",
    "to",
    "from",
    "cc",
    "bcc",
    "email_message_id",
    "type",
    "body_type",
    "include_body",
    "include_headers",
    "include_flags",
    "folder",
    "gm_search",
    "include_person_info",
    "file_name",
    "file_size_min",
    "file_size_max",
    "source",
    "include_thread_size",
    "include_source",
    "sort_order",
];

const FOLDER_LIST_PARAMS: &[&str] = &[
    "limit",
    "offset",
    "type",
    "include_body",
    "include_headers",
    "include_flags",
    "flag_seen",
    "async",
    "async_job_id",
];

const GET_PARAMS: &[&str] = &[
    "include_person_info",
    "type",
    "include_thread_size",
    "include_body",
    "include_headers",
    "include_flags",
    "body_type",
    "include_source",
];

const COPY_PARAMS: &[&str] = &[
    "dst_source",
    "dst_label",
    "dst_folder",
    "flag_seen",
    "flag_answered",
    "flag_flagged",
    "flag_deleted",
    "flag_draft",
    "move",
];

const THREAD_PARAMS: &[&str] = &[
    "include_body",
    "include_headers",
    "include_flags",
    "type",
    "include_person_info",
    "limit",
    "offset",
];

const SEND_PARAMS: &[&str] = &["rcpt", "message", "message_id", "gmail_thread_id"];

/// `messages/{id}` or `messages/{id}/{sub}`.
fn message_path(id: &MessageId, sub: Option<&str>) -> Result<String, ClientError> {
    let segment = id.path_segment();
    require_arg(&segment, "message id")?;
    Ok(match sub {
        Some(sub) => format!("messages/{segment}/{sub}"),
        None => format!("messages/{segment}"),
    })
}

/// Build the call that applies `change` at `action`.
///
/// [`FolderChange::Set`] is a `PUT` with a JSON array body;
/// [`FolderChange::AddRemove`] is a form `POST`.
pub(super) fn folder_change_call(
    action: String,
    change: &FolderChange,
) -> Result<ApiCall, ClientError> {
    match change {
        FolderChange::Set(folders) => {
            Ok(ApiCall::put(action).json_body(serde_json::to_vec(folders)?))
        }
        FolderChange::AddRemove { add, remove } => {
            let params = FolderChange::form_params(add, remove)?;
            Ok(ApiCall::post(action).params(params))
        }
    }
}

/// Validate copy/move parameters and normalize `move` to `1` or absent.
fn copy_params(params: &Parameters) -> Result<Parameters, ClientError> {
    let mut params = filter_params(params, COPY_PARAMS, &["dst_folder"])?;
    if let Some(value) = params.remove("move") {
        match value.as_str() {
            "1" | "true" => params.append("move", "1"),
            "0" | "false" => {}
            _ => return Err(ClientError::invalid("move must be boolean or 0/1")),
        }
    }
    Ok(params)
}

impl ContextIo {
    /// List messages of an account.
    pub fn list_messages(&self, account: &str, params: &Parameters) -> Result<Value, ClientError> {
        let params = filter_params(params, LIST_PARAMS, &[])?;
        self.json(ApiCall::get("messages").account(account).params(params))
    }

    /// List messages in one folder of a source.
    ///
    /// With `async_job_id` set, fetches the result of an earlier `async=1` call.
    pub fn list_messages_by_folder(
        &self,
        account: &str,
        label: &str,
        folder: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let mut params = filter_params(params, FOLDER_LIST_PARAMS, &[])?;
        let mut action = format!("{}/messages", folder_path(label, folder)?);
        if let Some(job) = params.remove("async_job_id") {
            action = format!("{action}/{}", encode(&job));
            params = Parameters::new();
        }
        self.json(ApiCall::get(action).account(account).params(params))
    }

    /// Copy or move an existing message into `dst_folder`.
    pub fn copy_message_to_folder(
        &self,
        account: &str,
        id: &MessageId,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = copy_params(params)?;
        self.json(
            ApiCall::post(message_path(id, None)?)
                .account(account)
                .params(params),
        )
    }

    /// Upload a raw RFC 822 message into `dst_folder`.
    ///
    /// The file is sent as the `message` part of a multipart body; the other
    /// parameters travel as form fields next to it.
    pub fn upload_message_to_folder(
        &self,
        account: &str,
        message: Upload,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = copy_params(params)?;
        self.json(
            ApiCall::post("messages")
                .account(account)
                .params(params)
                .upload(message),
        )
    }

    /// Get a message.
    pub fn get_message(
        &self,
        account: &str,
        id: &MessageId,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, GET_PARAMS, &[])?;
        self.json(
            ApiCall::get(message_path(id, None)?)
                .account(account)
                .params(params),
        )
    }

    /// Delete a message.
    pub fn delete_message(&self, account: &str, id: &MessageId) -> Result<Value, ClientError> {
        self.json(ApiCall::delete(message_path(id, None)?).account(account))
    }

    /// Get message headers. With `raw` they come back unparsed.
    pub fn get_message_headers(
        &self,
        account: &str,
        id: &MessageId,
        raw: bool,
    ) -> Result<Value, ClientError> {
        let params: Parameters = raw.then_some(("raw", "1")).into_iter().collect();
        self.json(
            ApiCall::get(message_path(id, Some("headers"))?)
                .account(account)
                .params(params),
        )
    }

    /// Raw RFC 822 source of a message.
    pub fn get_message_source(
        &self,
        account: &str,
        id: &MessageId,
    ) -> Result<Vec<u8>, ClientError> {
        let call = ApiCall::get(message_path(id, Some("source"))?)
            .account(account)
            .accept(ANY);
        Ok(self.request(call)?.into_bytes())
    }

    /// Get IMAP flags of a message.
    pub fn get_message_flags(&self, account: &str, id: &MessageId) -> Result<Value, ClientError> {
        let call = ApiCall::get(message_path(id, Some("flags"))?)
            .account(account);
        self.json(call)
    }

    /// Set or clear IMAP flags. At least one flag must be given.
    pub fn set_message_flags(
        &self,
        account: &str,
        id: &MessageId,
        flags: &MessageFlags,
    ) -> Result<Value, ClientError> {
        let params = flags.form_params()?;
        self.json(
            ApiCall::post(message_path(id, Some("flags"))?)
                .account(account)
                .params(params),
        )
    }

    /// Folders a message is in.
    pub fn get_message_folders(&self, account: &str, id: &MessageId) -> Result<Value, ClientError> {
        let call = ApiCall::get(message_path(id, Some("folders"))?)
            .account(account);
        self.json(call)
    }

    /// Change the folders a message is in.
    pub fn set_message_folders(
        &self,
        account: &str,
        id: &MessageId,
        change: &FolderChange,
    ) -> Result<Value, ClientError> {
        let call = folder_change_call(message_path(id, Some("folders"))?, change)?;
        self.json(call.account(account))
    }

    /// Message body parts, optionally only of one `type` (`text/plain`,
    /// `text/html`).
    pub fn get_message_body(
        &self,
        account: &str,
        id: &MessageId,
        body_type: Option<&str>,
    ) -> Result<Value, ClientError> {
        let params: Parameters = body_type.map(|t| ("type", t)).into_iter().collect();
        self.json(
            ApiCall::get(message_path(id, Some("body"))?)
                .account(account)
                .params(params),
        )
    }

    /// The thread a message belongs to.
    pub fn get_message_thread(
        &self,
        account: &str,
        id: &MessageId,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        let params = filter_params(params, THREAD_PARAMS, &[])?;
        self.json(
            ApiCall::get(message_path(id, Some("thread"))?)
                .account(account)
                .params(params),
        )
    }

    /// Send a message through the SMTP exit of source `label`.
    ///
    /// One of `message`, `message_id` or `gmail_thread_id` is required.
    pub fn send_message(
        &self,
        account: &str,
        label: &str,
        params: &Parameters,
    ) -> Result<Value, ClientError> {
        require_arg(label, "label")?;
        let params = filter_params(params, SEND_PARAMS, &[])?;
        if !["message", "message_id", "gmail_thread_id"]
            .iter()
            .any(|name| params.contains(name))
        {
            return Err(ClientError::invalid(
                "message, message_id or gmail_thread_id is required",
            ));
        }
        let action = format!("exits/{}", encode(label));
        self.json(ApiCall::post(action).account(account).params(params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cio_oauth::{HttpMethod, Parameters};
    use pretty_assertions::assert_eq;

    use super::super::tests::{ACCOUNT, client, last_params, last_path};
    use crate::error::ClientError;
    use crate::multipart::Upload;
    use crate::params::{FolderChange, MessageFlags, MessageId};
    use crate::response::Response;
    use crate::transport::MockTransport;

    fn account_url(action: &str) -> String {
        format!("https://api.context.io/2.0/accounts/{ACCOUNT}/{action}")
    }

    #[test]
    fn test_list_messages() {
        let transport = Arc::new(MockTransport::new().with_json(200, "[]"));
        let params = Parameters::new()
            .with("limit", "10")
            .with("include_body", "1");

        client(&transport).list_messages(ACCOUNT, &params).unwrap();

        assert_eq!(last_path(&transport), account_url("messages"));
        assert_eq!(
            last_params(&transport).to_query_string(),
            "limit=10&include_body=1"
        );
    }

    #[test]
    fn test_list_messages_by_folder_async_job() {
        let transport = Arc::new(MockTransport::new());
        let params = Parameters::new()
            .with("async_job_id", "job9")
            .with("limit", "5");

        client(&transport)
            .list_messages_by_folder(ACCOUNT, "src0", "INBOX", &params)
            .unwrap();

        assert_eq!(
            transport.last_request().url,
            account_url("sources/src0/folders/INBOX/messages/job9")
        );
    }

    #[test]
    fn test_get_message_by_email_message_id() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::EmailMessageId("<a1@mail.example.com>".to_owned());

        client(&transport)
            .get_message(ACCOUNT, &id, &Parameters::new())
            .unwrap();

        assert_eq!(
            last_path(&transport),
            account_url("messages/%3Ca1%40mail.example.com%3E")
        );
    }

    #[test]
    fn test_get_message_by_gmail_id() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::GmailMessageId("13a4f".to_owned());

        client(&transport)
            .get_message_flags(ACCOUNT, &id)
            .unwrap();

        assert_eq!(last_path(&transport), account_url("messages/gm-13a4f/flags"));
    }

    #[test]
    fn test_copy_message_move_flag() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::Id("m1".to_owned());
        let client = client(&transport);

        let params = Parameters::new()
            .with("dst_folder", "Archive")
            .with("move", "true");
        client
            .copy_message_to_folder(ACCOUNT, &id, &params)
            .unwrap();
        assert_eq!(
            last_params(&transport).to_query_string(),
            "dst_folder=Archive&move=1"
        );

        let params = Parameters::new()
            .with("dst_folder", "Archive")
            .with("move", "0");
        client
            .copy_message_to_folder(ACCOUNT, &id, &params)
            .unwrap();
        assert_eq!(
            last_params(&transport).to_query_string(),
            "dst_folder=Archive"
        );

        let params = Parameters::new()
            .with("dst_folder", "Archive")
            .with("move", "maybe");
        assert!(matches!(
            client.copy_message_to_folder(ACCOUNT, &id, &params),
            Err(ClientError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_upload_message_is_multipart() {
        let transport = Arc::new(MockTransport::new());
        let upload = Upload::new("message", "m.eml", "message/rfc822", "Subject: hi\r\n\r\nbody");
        let params = Parameters::new().with("dst_folder", "INBOX");

        client(&transport)
            .upload_message_to_folder(ACCOUNT, upload, &params)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.url, account_url("messages"));
        assert!(
            request
                .header("Content-Type")
                .unwrap()
                .starts_with("multipart/form-data; boundary=")
        );
        let body = String::from_utf8(request.body.unwrap()).unwrap();
        assert!(body.contains("name=\"dst_folder\"\r\n\r\nINBOX\r\n"));
        assert!(body.contains("filename=\"m.eml\""));
    }

    #[test]
    fn test_upload_requires_dst_folder() {
        let transport = Arc::new(MockTransport::new());
        let upload = Upload::new("message", "m.eml", "message/rfc822", "x");

        let result = client(&transport)
            .upload_message_to_folder(ACCOUNT, upload, &Parameters::new());

        assert!(result.is_err());
    }

    #[test]
    fn test_get_message_source_returns_bytes() {
        let transport = Arc::new(MockTransport::new().with_response(Response::new(
            200,
            vec![("Content-Type".to_owned(), "message/rfc822".to_owned())],
            "From: a@b.c\r\n",
        )));
        let id = MessageId::Id("m1".to_owned());

        let source = client(&transport).get_message_source(ACCOUNT, &id).unwrap();

        assert_eq!(source, b"From: a@b.c\r\n");
    }

    #[test]
    fn test_set_message_flags() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::Id("m1".to_owned());
        let flags = MessageFlags {
            seen: Some(true),
            ..MessageFlags::default()
        };

        client(&transport)
            .set_message_flags(ACCOUNT, &id, &flags)
            .unwrap();

        assert_eq!(transport.last_request().method, HttpMethod::Post);
        assert_eq!(last_params(&transport).to_query_string(), "seen=1");
    }

    #[test]
    fn test_set_message_folders_replace_is_json_put() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::Id("m1".to_owned());
        let change = FolderChange::Set(vec!["INBOX".to_owned(), "Work".to_owned()]);

        client(&transport)
            .set_message_folders(ACCOUNT, &id, &change)
            .unwrap();

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(br#"["INBOX","Work"]"#.as_slice()));
    }

    #[test]
    fn test_set_message_folders_add_remove_is_form_post() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::Id("m1".to_owned());
        let change = FolderChange::AddRemove {
            add: vec!["Work".to_owned()],
            remove: vec![],
        };

        client(&transport)
            .set_message_folders(ACCOUNT, &id, &change)
            .unwrap();

        assert_eq!(transport.last_request().method, HttpMethod::Post);
        assert_eq!(last_params(&transport).to_query_string(), "add=Work");
    }

    #[test]
    fn test_get_message_headers_raw() {
        let transport = Arc::new(MockTransport::new());
        let id = MessageId::Id("m1".to_owned());

        client(&transport)
            .get_message_headers(ACCOUNT, &id, true)
            .unwrap();

        assert_eq!(
            transport.last_request().url,
            account_url("messages/m1/headers?raw=1")
        );
    }

    #[test]
    fn test_send_message_requires_content() {
        let transport = Arc::new(MockTransport::new());
        let client = client(&transport);

        let params = Parameters::new().with("rcpt", "b@example.com");
        assert!(client.send_message(ACCOUNT, "src0", &params).is_err());

        let params = params.with("message_id", "m1");
        client.send_message(ACCOUNT, "src0", &params).unwrap();
        assert_eq!(last_path(&transport), account_url("exits/src0"));
    }
}
