//! CLI error types.

use cio_client::ClientError;
use cio_config::ConfigError;
use cio_oauth::OAuthError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    OAuth(#[from] OAuthError),

    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}
