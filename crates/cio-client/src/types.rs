//! Context.IO response types.
//!
//! Only the account-level objects are typed. Other endpoints return
//! [`serde_json::Value`] since their shape depends on the request parameters.

use serde::{Deserialize, Serialize};

/// Mailbox account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Account {
    /// Account ID.
    pub id: String,
    /// Account owner's first name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Account owner's last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email addresses attached to the account.
    #[serde(default)]
    pub email_addresses: Vec<String>,
    /// Unix time the account was created.
    #[serde(default)]
    pub created: Option<u64>,
    /// Unix time the account was suspended, `0` if active.
    #[serde(default)]
    pub suspended: Option<u64>,
    /// Mail sources.
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// IMAP mail source of an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Source {
    /// Source label, used as its identifier in URLs.
    pub label: String,
    /// Login username.
    #[serde(default)]
    pub username: Option<String>,
    /// IMAP server host.
    #[serde(default)]
    pub server: Option<String>,
    /// IMAP port.
    #[serde(default)]
    pub port: Option<u16>,
    /// Source type, usually `imap`.
    #[serde(rename = "type", default)]
    pub source_type: Option<String>,
    /// Connection status, e.g. `OK` or `INVALID_CREDENTIALS`.
    #[serde(default)]
    pub status: Option<String>,
}

/// Email address attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmailAddress {
    pub email: String,
    #[serde(default)]
    pub validated: Option<u64>,
    #[serde(default)]
    pub primary: Option<u8>,
}

/// Result of a create or modify call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Success {
    pub success: bool,
    /// ID of the created resource, when the endpoint returns one.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub resource_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_account_deserializes_with_sources() {
        let json = r#"{
            "id": "4f01234567890abcdef09876",
            "email_addresses": ["jim@example.com"],
            "first_name": "Jim",
            "created": 1325376000,
            "suspended": 0,
            "sources": [{"label": "jim::imap.example.com", "type": "imap", "port": 993, "status": "OK"}],
            "nb_messages": 1024
        }"#;

        let account: Account = serde_json::from_str(json).unwrap();

        assert_eq!(account.first_name.as_deref(), Some("Jim"));
        assert_eq!(account.last_name, None);
        assert_eq!(account.sources[0].source_type.as_deref(), Some("imap"));
        assert_eq!(account.sources[0].port, Some(993));
    }

    #[test]
    fn test_success_without_id() {
        let success: Success = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(success.success);
        assert_eq!(success.id, None);
    }
}
