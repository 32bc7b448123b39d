//! `cio accounts` subcommands.

use cio_client::{Account, ContextIo};
use clap::{Args, Subcommand};

use super::{ConnectionArgs, parse_param, to_parameters};
use crate::error::CliError;
use crate::output::Output;

/// Account commands.
#[derive(Subcommand)]
pub(crate) enum AccountsCommand {
    /// List accounts of the application.
    List(ListArgs),
    /// Show one account.
    Get(GetArgs),
}

/// Arguments for `accounts list`.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Filter as key=value: limit, offset, email, status, status_ok (repeatable).
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,

    #[command(flatten)]
    connection: ConnectionArgs,
}

/// Arguments for `accounts get`.
#[derive(Args)]
pub(crate) struct GetArgs {
    /// Account id.
    id: String,

    #[command(flatten)]
    connection: ConnectionArgs,
}

impl AccountsCommand {
    /// Execute the accounts subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the API call fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        match self {
            Self::List(args) => {
                let client = ContextIo::from_config(&args.connection.load_config()?)?;
                let accounts = client.list_accounts(&to_parameters(&args.params))?;
                output.success(&format!("{} accounts", accounts.len()));
                for account in &accounts {
                    output.result(&summary(account));
                }
            }
            Self::Get(args) => {
                let client = ContextIo::from_config(&args.connection.load_config()?)?;
                let account = client.get_account(&args.id)?;
                output.highlight(&summary(&account));
                output.result(&serde_json::to_string_pretty(&account)?);
            }
        }
        Ok(())
    }
}

/// One-line account summary: id, addresses and source count.
fn summary(account: &Account) -> String {
    let addresses = if account.email_addresses.is_empty() {
        "-".to_owned()
    } else {
        account.email_addresses.join(", ")
    };
    format!(
        "{}  {}  ({} sources)",
        account.id,
        addresses,
        account.sources.len()
    )
}
