//! `cio verify` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use cio_config::Config;
use cio_oauth::{
    Consumer, HttpMethod, MemoryStore, OAuthRequest, Server, Token, TokenType, Verified,
};
use clap::Args;

use super::{parse_method, parse_param, to_parameters};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the verify command.
#[derive(Args)]
pub(crate) struct VerifyArgs {
    /// HTTP method the request was sent with.
    #[arg(value_parser = parse_method)]
    method: HttpMethod,

    /// Request URL as received, including any query string.
    url: String,

    /// `Authorization` header value.
    #[arg(short, long)]
    authorization: Option<String>,

    /// Form body parameter as key=value (repeatable).
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Path to configuration file (default: auto-discover contextio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl VerifyArgs {
    /// Execute the verify command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete or the request is
    /// rejected.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let server = server_from_config(&config)?;

        let body = to_parameters(&self.params);
        let request = OAuthRequest::from_parts(
            self.method,
            &self.url,
            self.authorization.as_deref(),
            Some(&body),
        )?;
        let verified = server.verify_request(&request)?;

        output.success("Signature valid");
        output.result(&describe(&verified));
        Ok(())
    }
}

/// Verification server knowing only the configured consumer and access token.
fn server_from_config(config: &Config) -> Result<Server, CliError> {
    let credentials = config.require_credentials()?;
    let mut store = MemoryStore::new().with_consumer(Consumer::new(
        &credentials.consumer_key,
        &credentials.consumer_secret,
    ));
    if let Some((key, secret)) = credentials.access_token() {
        store = store.with_token(
            &credentials.consumer_key,
            TokenType::Access,
            Token::new(key, secret),
        );
    }
    Ok(Server::from_store(Arc::new(store))
        .with_timestamp_threshold(config.verification.timestamp_threshold))
}

fn describe(verified: &Verified) -> String {
    match &verified.token {
        Some(token) => format!(
            "consumer: {}\ntoken: {}",
            verified.consumer.key(),
            token.key()
        ),
        None => format!("consumer: {} (two-legged)", verified.consumer.key()),
    }
}

#[cfg(test)]
mod tests {
    use cio_oauth::{AuthMode, Credentials, OAuthError, Signer, SigningRequest};
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(dir: &tempfile::TempDir, body: &str) -> Config {
        let path = dir.path().join("contextio.toml");
        std::fs::write(&path, body).unwrap();
        Config::load(Some(&path), None).unwrap()
    }

    const THREE_LEGGED: &str = r#"
[credentials]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "tk"
access_token_secret = "ts"
"#;

    #[test]
    fn test_verifies_signed_request() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_from_config(&config(&dir, THREE_LEGGED)).unwrap();
        let signer = Signer::new(Credentials::with_token(
            Consumer::new("ck", "cs"),
            Token::new("tk", "ts"),
        ));
        let signed = signer
            .sign(
                SigningRequest::new(HttpMethod::Get, "https://api.context.io/2.0/accounts")
                    .param("limit", "10"),
                AuthMode::Header,
            )
            .unwrap();

        let request = OAuthRequest::from_parts(
            signed.method,
            &signed.url,
            signed.header("Authorization"),
            None,
        )
        .unwrap();
        let verified = server.verify_request(&request).unwrap();

        assert_eq!(describe(&verified), "consumer: ck\ntoken: tk");
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let dir = tempfile::tempdir().unwrap();
        let server = server_from_config(&config(&dir, THREE_LEGGED)).unwrap();
        let signer = Signer::new(Credentials::consumer_only(Consumer::new("ck", "wrong")));
        let signed = signer
            .sign(
                SigningRequest::new(HttpMethod::Get, "https://api.context.io/2.0/discovery"),
                AuthMode::Query,
            )
            .unwrap();

        let request = OAuthRequest::from_parts(signed.method, &signed.url, None, None).unwrap();

        assert!(matches!(
            server.verify_request(&request),
            Err(OAuthError::InvalidSignature)
        ));
    }

    #[test]
    fn test_requires_credentials_section() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, "[api]\nssl = true\n");

        assert!(matches!(
            server_from_config(&config),
            Err(CliError::Config(_))
        ));
    }
}
