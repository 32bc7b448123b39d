//! Configuration management for the Context.IO client.
//!
//! Parses `contextio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `api.endpoint`
//! - `credentials.consumer_key`
//! - `credentials.consumer_secret`
//! - `credentials.access_token`
//! - `credentials.access_token_secret`

mod expand;

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override API endpoint host.
    pub endpoint: Option<String>,
    /// Override TLS usage.
    pub ssl: Option<bool>,
    /// Override how OAuth parameters are transmitted.
    pub auth_mode: Option<AuthMode>,
    /// Override request timeout.
    pub timeout_secs: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "contextio.toml";

/// The only API version the client speaks.
pub const SUPPORTED_API_VERSION: &str = "2.0";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API endpoint configuration.
    pub api: ApiConfig,
    /// OAuth credentials (optional section).
    pub credentials: Option<CredentialsConfig>,
    /// Server-side verification settings.
    pub verification: VerificationConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// API endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API host, without scheme.
    pub endpoint: String,
    /// API version path segment.
    pub version: String,
    /// Use `https`.
    pub ssl: bool,
    /// How OAuth parameters are transmitted.
    pub auth_mode: AuthMode,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "api.context.io".to_owned(),
            version: SUPPORTED_API_VERSION.to_owned(),
            ssl: true,
            auth_mode: AuthMode::Header,
            timeout_secs: 30,
        }
    }
}

/// Transmission of OAuth protocol parameters for API calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `Authorization: OAuth ...` header.
    #[default]
    Header,
    /// Signed query string.
    Query,
    /// One composed URL carrying every parameter.
    Url,
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "header",
            Self::Query => "query",
            Self::Url => "url",
        })
    }
}

/// OAuth credentials.
#[derive(Debug, Deserialize)]
pub struct CredentialsConfig {
    /// OAuth consumer key.
    pub consumer_key: String,
    /// OAuth consumer secret.
    pub consumer_secret: String,
    /// OAuth access token, empty for two-legged use.
    #[serde(default)]
    pub access_token: String,
    /// OAuth access token secret.
    #[serde(default)]
    pub access_token_secret: String,
}

impl CredentialsConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if a consumer field is empty or only
    /// one half of the access token is set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.consumer_key, "credentials.consumer_key")?;
        require_non_empty(&self.consumer_secret, "credentials.consumer_secret")?;
        if self.access_token.is_empty() != self.access_token_secret.is_empty() {
            return Err(ConfigError::Validation(
                "credentials.access_token and credentials.access_token_secret must be set together"
                    .to_owned(),
            ));
        }
        Ok(())
    }

    /// Access token and secret, if configured.
    pub fn access_token(&self) -> Option<(&str, &str)> {
        if self.access_token.is_empty() {
            None
        } else {
            Some((&self.access_token, &self.access_token_secret))
        }
    }
}

/// Server-side verification settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Freshness window for `oauth_timestamp`, in seconds.
    pub timestamp_threshold: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            timestamp_threshold: 300,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`credentials.consumer_key`").
        field: String,
        /// Error message (e.g., "${`CONTEXTIO_KEY`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `contextio.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result does not validate.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(endpoint) = &settings.endpoint {
            self.api.endpoint.clone_from(endpoint);
        }
        if let Some(ssl) = settings.ssl {
            self.api.ssl = ssl;
        }
        if let Some(auth_mode) = settings.auth_mode {
            self.api.auth_mode = auth_mode;
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.api.timeout_secs = timeout_secs;
        }
    }

    /// Get validated credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or invalid.
    pub fn require_credentials(&self) -> Result<&CredentialsConfig, ConfigError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            ConfigError::Validation("[credentials] section required in config".into())
        })?;
        credentials.validate()?;
        Ok(credentials)
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_api()?;

        if self.verification.timestamp_threshold == 0 {
            return Err(ConfigError::Validation(
                "verification.timestamp_threshold must be greater than 0".to_owned(),
            ));
        }

        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }

        Ok(())
    }

    fn validate_api(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.api.endpoint, "api.endpoint")?;
        if self.api.endpoint.contains("://") || self.api.endpoint.contains('/') {
            return Err(ConfigError::Validation(
                "api.endpoint must be a host name without scheme or path".to_owned(),
            ));
        }

        if self.api.version != SUPPORTED_API_VERSION {
            return Err(ConfigError::Validation(format!(
                "api.version '{}' not supported, expected {SUPPORTED_API_VERSION}",
                self.api.version
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.api.endpoint = expand::expand_env(&self.api.endpoint, "api.endpoint")?;

        if let Some(ref mut credentials) = self.credentials {
            credentials.consumer_key =
                expand::expand_env(&credentials.consumer_key, "credentials.consumer_key")?;
            credentials.consumer_secret =
                expand::expand_env(&credentials.consumer_secret, "credentials.consumer_secret")?;
            credentials.access_token =
                expand::expand_env(&credentials.access_token, "credentials.access_token")?;
            credentials.access_token_secret = expand::expand_env(
                &credentials.access_token_secret,
                "credentials.access_token_secret",
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn credentials(key: &str, secret: &str) -> CredentialsConfig {
        CredentialsConfig {
            consumer_key: key.to_owned(),
            consumer_secret: secret.to_owned(),
            access_token: String::new(),
            access_token_secret: String::new(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.endpoint, "api.context.io");
        assert_eq!(config.api.version, "2.0");
        assert!(config.api.ssl);
        assert_eq!(config.api.auth_mode, AuthMode::Header);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.verification.timestamp_threshold, 300);
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.api.endpoint, "api.context.io");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[api]
endpoint = "api.example.com"
version = "2.0"
ssl = false
auth_mode = "query"
timeout_secs = 5

[credentials]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "tk"
access_token_secret = "ts"

[verification]
timestamp_threshold = 60
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.endpoint, "api.example.com");
        assert!(!config.api.ssl);
        assert_eq!(config.api.auth_mode, AuthMode::Query);
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.verification.timestamp_threshold, 60);

        let credentials = config.require_credentials().unwrap();
        assert_eq!(credentials.consumer_key, "ck");
        assert_eq!(credentials.access_token(), Some(("tk", "ts")));
    }

    #[test]
    fn test_parse_url_auth_mode() {
        let config: Config = toml::from_str("[api]\nauth_mode = \"url\"\n").unwrap();
        assert_eq!(config.api.auth_mode, AuthMode::Url);
    }

    #[test]
    fn test_parse_unknown_auth_mode() {
        let toml = r#"
[api]
auth_mode = "cookie"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn test_access_token_optional() {
        let credentials = credentials("ck", "cs");
        assert!(credentials.validate().is_ok());
        assert_eq!(credentials.access_token(), None);
    }

    #[test]
    fn test_access_token_requires_secret() {
        let mut credentials = credentials("ck", "cs");
        credentials.access_token = "tk".to_owned();

        let err = credentials.validate().unwrap_err();
        assert!(err.to_string().contains("must be set together"));
    }

    #[test]
    fn test_validate_empty_consumer_key() {
        let err = credentials("", "cs").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("credentials.consumer_key"));
    }

    #[test]
    fn test_validate_unsupported_version() {
        let mut config = Config::default();
        config.api.version = "1.1".to_owned();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.version '1.1' not supported"));
    }

    #[test]
    fn test_validate_endpoint_with_scheme() {
        let mut config = Config::default();
        config.api.endpoint = "https://api.context.io".to_owned();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_timeout_zero() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.timeout_secs"));
    }

    #[test]
    fn test_validate_threshold_zero() {
        let mut config = Config::default();
        config.verification.timestamp_threshold = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("verification.timestamp_threshold"));
    }

    #[test]
    fn test_require_credentials_missing_section() {
        let config = Config::default();
        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("[credentials] section required"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            endpoint: Some("localhost:8080".to_owned()),
            ssl: Some(false),
            auth_mode: Some(AuthMode::Query),
            timeout_secs: Some(3),
        });

        assert_eq!(config.api.endpoint, "localhost:8080");
        assert!(!config.api.ssl);
        assert_eq!(config.api.auth_mode, AuthMode::Query);
        assert_eq!(config.api.timeout_secs, 3);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.api.endpoint, "api.context.io");
        assert_eq!(config.api.auth_mode, AuthMode::Header);
    }

    #[test]
    fn test_expand_env_vars_credentials() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("CIO_CONFIG_TEST_KEY", "env-key");
            std::env::set_var("CIO_CONFIG_TEST_SECRET", "env-secret");
            std::env::remove_var("CIO_CONFIG_TEST_TOKEN");
        }

        let toml = r#"
[credentials]
consumer_key = "${CIO_CONFIG_TEST_KEY}"
consumer_secret = "${CIO_CONFIG_TEST_SECRET}"
access_token = "${CIO_CONFIG_TEST_TOKEN:-}"
access_token_secret = "${CIO_CONFIG_TEST_TOKEN:-}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        let credentials = config.credentials.unwrap();
        assert_eq!(credentials.consumer_key, "env-key");
        assert_eq!(credentials.consumer_secret, "env-secret");
        assert_eq!(credentials.access_token(), None);

        unsafe {
            std::env::remove_var("CIO_CONFIG_TEST_KEY");
            std::env::remove_var("CIO_CONFIG_TEST_SECRET");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("CIO_CONFIG_TEST_MISSING");
        }

        let toml = r#"
[credentials]
consumer_key = "${CIO_CONFIG_TEST_MISSING}"
consumer_secret = "cs"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("credentials.consumer_key"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
[api]
auth_mode = "query"

[credentials]
consumer_key = "ck"
consumer_secret = "cs"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.api.auth_mode, AuthMode::Query);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[api]\nversion = \"1.0\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/contextio.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_cli_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            timeout_secs: Some(0),
            ..CliSettings::default()
        };
        assert!(Config::load(Some(&path), Some(&settings)).is_err());
    }
}
