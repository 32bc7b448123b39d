//! Argument validation shared by the endpoint methods.

use cio_oauth::{Parameters, encode};

use crate::error::ClientError;

/// Lower-case parameter names and check them against an endpoint's lists.
///
/// Fails if a name is not in `valid` or a `required` name is missing.
/// Values are kept as given, including repeated names.
///
/// # Errors
///
/// Returns [`ClientError::InvalidArgument`] naming the offending parameter.
pub fn filter_params(
    params: &Parameters,
    valid: &[&str],
    required: &[&str],
) -> Result<Parameters, ClientError> {
    let mut filtered = Parameters::new();
    for (name, value) in params.iter() {
        let name = name.to_ascii_lowercase();
        if !valid.contains(&name.as_str()) {
            return Err(ClientError::invalid(format!("unknown parameter '{name}'")));
        }
        filtered.append(name, value);
    }

    if let Some(missing) = required.iter().find(|r| !filtered.contains(r)) {
        return Err(ClientError::invalid(format!(
            "missing required parameter '{missing}'"
        )));
    }

    Ok(filtered)
}

/// Reject account ids that are empty or look like an email address.
pub(crate) fn check_account_id(account: &str) -> Result<(), ClientError> {
    if account.is_empty() || account.contains('@') {
        return Err(ClientError::invalid(
            "account must be a string representing an account id",
        ));
    }
    Ok(())
}

/// Reject empty path arguments.
pub(crate) fn require_arg(value: &str, name: &str) -> Result<(), ClientError> {
    if value.is_empty() {
        return Err(ClientError::invalid(format!("{name} cannot be empty")));
    }
    Ok(())
}

/// Prefix a Gmail id with `gm-` unless it already has it.
pub(crate) fn gmail_id(id: &str) -> String {
    if id.starts_with("gm-") {
        id.to_owned()
    } else {
        format!("gm-{id}")
    }
}

/// Ways to address a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageId {
    /// Context.IO message id.
    Id(String),
    /// `Message-ID` header value.
    EmailMessageId(String),
    /// Gmail message id, with or without the `gm-` prefix.
    GmailMessageId(String),
}

impl MessageId {
    /// Path segment under `messages/`.
    pub fn path_segment(&self) -> String {
        match self {
            Self::Id(id) | Self::EmailMessageId(id) => encode(id),
            Self::GmailMessageId(id) => encode(&gmail_id(id)),
        }
    }
}

impl From<&str> for MessageId {
    /// A bare string is an email `Message-ID` or a Context.IO id; both are
    /// sent percent-encoded.
    fn from(id: &str) -> Self {
        Self::EmailMessageId(id.to_owned())
    }
}

/// Folder membership change for a message or thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderChange {
    /// Replace the folder list (sent as a JSON array with PUT).
    Set(Vec<String>),
    /// Add to and remove from folders (sent as a form with POST).
    AddRemove {
        /// Folders to add.
        add: Vec<String>,
        /// Folders to remove.
        remove: Vec<String>,
    },
}

impl FolderChange {
    /// Form parameters for [`FolderChange::AddRemove`].
    ///
    /// A single value is sent as `add`, several as repeated `add[]`.
    pub(crate) fn form_params(
        add: &[String],
        remove: &[String],
    ) -> Result<Parameters, ClientError> {
        if add.is_empty() && remove.is_empty() {
            return Err(ClientError::invalid(
                "must specify at least one of add, remove",
            ));
        }
        let mut params = Parameters::new();
        for (name, values) in [("add", add), ("remove", remove)] {
            match values {
                [] => {}
                [single] => params.append(name, single.as_str()),
                many => params.append_all(&format!("{name}[]"), many.iter().map(String::as_str)),
            }
        }
        Ok(params)
    }
}

/// Message flags to change. `None` leaves a flag as is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageFlags {
    pub seen: Option<bool>,
    pub answered: Option<bool>,
    pub flagged: Option<bool>,
    pub deleted: Option<bool>,
    pub draft: Option<bool>,
}

impl MessageFlags {
    /// Form parameters with flags as `1`/`0`.
    pub(crate) fn form_params(&self) -> Result<Parameters, ClientError> {
        let params: Parameters = [
            ("seen", self.seen),
            ("answered", self.answered),
            ("flagged", self.flagged),
            ("deleted", self.deleted),
            ("draft", self.draft),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, flag_value(v))))
        .collect();

        if params.is_empty() {
            return Err(ClientError::invalid(
                "must specify at least one of seen, answered, flagged, deleted, draft",
            ));
        }
        Ok(params)
    }
}

fn flag_value(set: bool) -> &'static str {
    if set { "1" } else { "0" }
}
