//! `cio sign` command implementation.

use std::path::PathBuf;

use cio_client::credentials_from_config;
use cio_config::Config;
use cio_oauth::{AuthMode, HttpMethod, SignedRequest, Signer, SigningRequest};
use clap::{Args, ValueEnum};

use super::{parse_method, parse_param, to_parameters};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sign command.
#[derive(Args)]
pub(crate) struct SignArgs {
    /// HTTP method (GET, POST, PUT, DELETE).
    #[arg(value_parser = parse_method)]
    method: HttpMethod,

    /// Full request URL, may include a query string.
    url: String,

    /// Application parameter as key=value (repeatable).
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Where to put the OAuth parameters.
    #[arg(short, long, value_enum, default_value_t = SignMode::Header)]
    mode: SignMode,

    /// Sign without the configured access token.
    #[arg(long)]
    two_legged: bool,

    /// Path to configuration file (default: auto-discover contextio.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// `--mode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SignMode {
    Header,
    Query,
    Url,
}

impl From<SignMode> for AuthMode {
    fn from(mode: SignMode) -> Self {
        match mode {
            SignMode::Header => Self::Header,
            SignMode::Query => Self::Query,
            SignMode::Url => Self::Url,
        }
    }
}

impl SignArgs {
    /// Execute the sign command.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the request cannot be signed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), None)?;
        let credentials = credentials_from_config(&config)?;
        let mut signer = Signer::new(credentials);
        if self.two_legged {
            signer = signer.without_token();
        }

        let request = SigningRequest::new(self.method, &self.url)
            .params(to_parameters(&self.params));
        let signed = signer.sign(request, self.mode.into())?;

        output.detail(&format!(
            "{} signed with {} ({} mode)",
            signed.method,
            signer.method_name(),
            AuthMode::from(self.mode),
        ));
        for line in render(&signed) {
            output.result(&line);
        }
        Ok(())
    }
}

/// Lines describing a signed request: URL, headers, then body.
fn render(signed: &SignedRequest) -> Vec<String> {
    let mut lines = vec![signed.url.clone()];
    lines.extend(
        signed
            .headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}")),
    );
    if let Some(body) = &signed.body {
        lines.push(String::new());
        lines.push(String::from_utf8_lossy(body).into_owned());
    }
    lines
}

#[cfg(test)]
mod tests {
    use cio_oauth::{Consumer, Credentials, Parameters};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_render_post_with_body() {
        let signer = Signer::new(Credentials::consumer_only(Consumer::new("ck", "cs")));
        let signed = signer
            .sign(
                SigningRequest::new(HttpMethod::Post, "https://api.context.io/2.0/accounts")
                    .params(Parameters::new().with("email", "a@b.c")),
                AuthMode::Header,
            )
            .unwrap();

        let lines = render(&signed);

        assert_eq!(lines[0], "https://api.context.io/2.0/accounts");
        assert!(lines[1].starts_with("Authorization: OAuth "));
        assert_eq!(lines[2], "Content-Type: application/x-www-form-urlencoded");
        assert_eq!(lines.last().map(String::as_str), Some("email=a%40b.c"));
    }

    #[test]
    fn test_render_url_mode_has_no_headers() {
        let signer = Signer::new(Credentials::consumer_only(Consumer::new("ck", "cs")));
        let signed = signer
            .sign(
                SigningRequest::new(HttpMethod::Get, "https://api.context.io/2.0/accounts"),
                SignMode::Url.into(),
            )
            .unwrap();

        let lines = render(&signed);

        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("oauth_signature="));
    }
}
