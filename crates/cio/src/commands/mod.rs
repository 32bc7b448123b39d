//! CLI command implementations.

pub(crate) mod accounts;
pub(crate) mod call;
pub(crate) mod sign;
pub(crate) mod verify;

use std::path::PathBuf;

use cio_config::{AuthMode, CliSettings, Config};
use cio_oauth::{HttpMethod, Parameters};
use clap::{Args, ValueEnum};

use crate::error::CliError;

pub(crate) use accounts::AccountsCommand;
pub(crate) use call::CallArgs;
pub(crate) use sign::SignArgs;
pub(crate) use verify::VerifyArgs;

/// Connection options shared by commands that talk to the API.
#[derive(Args, Debug, Default)]
pub(crate) struct ConnectionArgs {
    /// Path to configuration file (default: auto-discover contextio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API host (overrides config).
    #[arg(long, env = "CONTEXTIO_ENDPOINT")]
    endpoint: Option<String>,

    /// Use plain HTTP instead of HTTPS.
    #[arg(long)]
    insecure: bool,

    /// How OAuth parameters are sent (overrides config).
    #[arg(long, value_enum)]
    auth_mode: Option<ModeArg>,

    /// Request timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,
}

impl ConnectionArgs {
    /// Load the configuration with these overrides applied.
    pub(crate) fn load_config(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            endpoint: self.endpoint.clone(),
            ssl: self.insecure.then_some(false),
            auth_mode: self.auth_mode.map(AuthMode::from),
            timeout_secs: self.timeout,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// `--auth-mode` values for API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    Header,
    Query,
    Url,
}

impl From<ModeArg> for AuthMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Header => Self::Header,
            ModeArg::Query => Self::Query,
            ModeArg::Url => Self::Url,
        }
    }
}

/// Parse an HTTP method argument, case-insensitively.
pub(crate) fn parse_method(s: &str) -> Result<HttpMethod, String> {
    s.to_ascii_uppercase().parse().map_err(|e| format!("{e}"))
}

/// Parse a `key=value` argument. The value may be empty or contain `=`.
pub(crate) fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// Collect parsed `-p` arguments, keeping order and repeats.
pub(crate) fn to_parameters(pairs: &[(String, String)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("limit=10").unwrap(),
            ("limit".to_owned(), "10".to_owned())
        );
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".to_owned(), "a=b".to_owned())
        );
        assert_eq!(
            parse_param("empty=").unwrap(),
            ("empty".to_owned(), String::new())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("get").unwrap(), HttpMethod::Get);
        assert_eq!(parse_method("DELETE").unwrap(), HttpMethod::Delete);
        assert!(parse_method("PATCH").is_err());
    }

    #[test]
    fn test_to_parameters_keeps_repeats() {
        let pairs = vec![
            ("tag".to_owned(), "a".to_owned()),
            ("tag".to_owned(), "b".to_owned()),
        ];

        let params = to_parameters(&pairs);

        assert_eq!(params.get_all("tag").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_connection_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contextio.toml");
        std::fs::write(&path, "[api]\nendpoint = \"api.context.io\"\n").unwrap();

        let args = ConnectionArgs {
            config: Some(path),
            endpoint: Some("localhost:8080".to_owned()),
            insecure: true,
            auth_mode: Some(ModeArg::Query),
            timeout: Some(5),
        };
        let config = args.load_config().unwrap();

        assert_eq!(config.api.endpoint, "localhost:8080");
        assert!(!config.api.ssl);
        assert_eq!(config.api.auth_mode, AuthMode::Query);
        assert_eq!(config.api.timeout_secs, 5);
    }
}
