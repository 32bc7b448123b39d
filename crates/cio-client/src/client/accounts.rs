//! Account and account email address operations.

use cio_oauth::{Parameters, encode};
use serde_json::Value;
use tracing::info;

use super::{ApiCall, ContextIo};
use crate::error::ClientError;
use crate::params::{filter_params, require_arg};
use crate::types::{Account, EmailAddress, Success};

const LIST_PARAMS: &[&str] = &["limit", "offset", "email", "status_ok", "status"];

const ADD_PARAMS: &[&str] = &[
    "email",
    "first_name",
    "last_name",
    "type",
    "server",
    "username",
    "provider_consumer_key",
    "provider_token",
    "provider_token_secret",
    "provider_refresh_token",
    "service_level",
    "sync_period",
    "password",
    "use_ssl",
    "port",
    "callback_url",
    "sync_flags",
    "raw_file_list",
    "expunge_on_deleted_flag",
    "migrate_account_id",
];

const MODIFY_PARAMS: &[&str] = &["first_name", "last_name"];

impl ContextIo {
    /// List accounts of the application.
    pub fn list_accounts(&self, params: &Parameters) -> Result<Vec<Account>, ClientError> {
        let params = filter_params(params, LIST_PARAMS, &[])?;
        let call = ApiCall::get("accounts").params(params);
        let accounts: Vec<Account> = self.request(call)?.json()?;
        info!("Found {} accounts", accounts.len());
        Ok(accounts)
    }

    /// Get one account.
    pub fn get_account(&self, account: &str) -> Result<Account, ClientError> {
        self.request(ApiCall::get("").account(account))?.json()
    }

    /// Create an account. `email` is required.
    pub fn add_account(&self, params: &Parameters) -> Result<Success, ClientError> {
        let params = filter_params(params, ADD_PARAMS, &["email"])?;
        let call = ApiCall::post("accounts").params(params);
        self.request(call)?.json()
    }

    /// Change the owner's name.
    pub fn modify_account(
        &self,
        account: &str,
        params: &Parameters,
    ) -> Result<Success, ClientError> {
        let params = filter_params(params, MODIFY_PARAMS, &[])?;
        let call = ApiCall::post("").account(account).params(params);
        self.request(call)?.json()
    }

    /// Delete an account.
    pub fn delete_account(&self, account: &str) -> Result<Success, ClientError> {
        self.request(ApiCall::delete("").account(account))?.json()
    }

    /// List email addresses attached to an account.
    pub fn list_account_email_addresses(
        &self,
        account: &str,
    ) -> Result<Vec<EmailAddress>, ClientError> {
        let call = ApiCall::get("email_addresses").account(account);
        self.request(call)?.json()
    }

    /// Attach an email address to an account.
    pub fn add_email_address_to_account(
        &self,
        account: &str,
        email_address: &str,
    ) -> Result<Value, ClientError> {
        require_arg(email_address, "email_address")?;
        let params = Parameters::new().with("email_address", email_address);
        let call = ApiCall::post("email_addresses")
            .account(account)
            .params(params);
        self.json(call)
    }

    /// Detach an email address.
    pub fn delete_email_address_from_account(
        &self,
        account: &str,
        email_address: &str,
    ) -> Result<Value, ClientError> {
        require_arg(email_address, "email_address")?;
        let action = format!("email_addresses/{}", encode(email_address));
        self.json(ApiCall::delete(action).account(account))
    }

    /// Make an attached email address the primary one.
    pub fn set_primary_email_address_for_account(
        &self,
        account: &str,
        email_address: &str,
    ) -> Result<Value, ClientError> {
        require_arg(email_address, "email_address")?;
        let action = format!("email_addresses/{}", encode(email_address));
        let params = Parameters::new().with("primary", "1");
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
    use crate::transport::MockTransport;

    #[test]
    fn test_list_accounts() {
        let transport = Arc::new(MockTransport::new().with_json(
            200,
            r#"[{"id":"a1","email_addresses":["a@x.com"]},{"id":"a2"}]"#,
        ));
        let params = Parameters::new().with("limit", "2");

        let accounts = client(&transport).list_accounts(&params).unwrap();

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].email_addresses, vec!["a@x.com".to_owned()]);
        assert_eq!(
            transport.last_request().url.split('?').nth(1),
            Some("limit=2")
        );
    }

    #[test]
    fn test_list_accounts_rejects_unknown_param() {
        let transport = Arc::new(MockTransport::new());
        let params = Parameters::new().with("page", "2");

        let result = client(&transport).list_accounts(&params);

        assert!(matches!(result, Err(ClientError::InvalidArgument(_))));
    }

    #[test]
    fn test_get_account() {
        let transport = Arc::new(
            MockTransport::new().with_json(200, r#"{"id":"4f01234567890abcdef09876"}"#),
        );

        let account = client(&transport).get_account(ACCOUNT).unwrap();

        assert_eq!(account.id, ACCOUNT);
        assert_eq!(
            last_path(&transport),
            format!("https://api.context.io/2.0/accounts/{ACCOUNT}")
        );
    }

    #[test]
    fn test_add_account_requires_email() {
        let transport = Arc::new(MockTransport::new());
        let params = Parameters::new().with("first_name", "Jim");

        assert!(client(&transport).add_account(&params).is_err());
    }

    #[test]
    fn test_modify_account_posts_to_account_root() {
        let transport = Arc::new(MockTransport::new().with_json(200, r#"{"success":true}"#));
        let params = Parameters::new().with("last_name", "Doe");

        let result = client(&transport).modify_account(ACCOUNT, &params).unwrap();

        assert!(result.success);
        assert_eq!(transport.last_request().method, HttpMethod::Post);
        assert_eq!(last_params(&transport).to_query_string(), "last_name=Doe");
    }

    #[test]
    fn test_set_primary_email_address() {
        let transport = Arc::new(MockTransport::new());

        client(&transport)
            .set_primary_email_address_for_account(ACCOUNT, "jim@example.com")
            .unwrap();

        assert_eq!(
            last_path(&transport),
            format!("https://api.context.io/2.0/accounts/{ACCOUNT}/email_addresses/jim%40example.com")
        );
        assert_eq!(last_params(&transport).to_query_string(), "primary=1");
    }
}
