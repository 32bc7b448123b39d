//! `cio call` command implementation.

use cio_client::{ApiCall, ContextIo, Response};
use cio_oauth::HttpMethod;
use clap::Args;

use super::{ConnectionArgs, parse_method, parse_param, to_parameters};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the call command.
#[derive(Args)]
pub(crate) struct CallArgs {
    /// HTTP method (GET, POST, PUT, DELETE).
    #[arg(value_parser = parse_method)]
    method: HttpMethod,

    /// Action path relative to the API version, e.g. `accounts` or `messages`.
    action: String,

    /// Scope the call to this account id.
    #[arg(short, long)]
    account: Option<String>,

    /// Request parameter as key=value (repeatable).
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl CallArgs {
    /// Execute the call command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the API call fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = self.connection.load_config()?;
        let client = ContextIo::from_config(&config)?;

        let mut call = ApiCall::new(self.method, self.action.trim_matches('/'))
            .params(to_parameters(&self.params))
            .accept(&[]);
        if let Some(account) = self.account {
            call = call.account(account);
        }

        let response = client.request(call)?;
        output.result(&format_body(&response)?);
        Ok(())
    }
}

/// Pretty-print JSON bodies; other bodies are printed as text.
fn format_body(response: &Response) -> Result<String, CliError> {
    if response.content_type().as_deref() == Some("application/json") {
        let value: serde_json::Value = response.json()?;
        Ok(serde_json::to_string_pretty(&value)?)
    } else {
        Ok(response.text())
    }
}
