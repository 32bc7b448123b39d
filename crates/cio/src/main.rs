//! cio CLI - Context.IO API client.
//!
//! Provides commands for:
//! - `sign`: Sign a request and print it
//! - `verify`: Verify a signed request against the configured credentials
//! - `call`: Perform a signed API call
//! - `accounts list|get`: Account shortcuts

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AccountsCommand, CallArgs, SignArgs, VerifyArgs};
use output::Output;

/// cio - Context.IO API client.
#[derive(Parser)]
#[command(name = "cio", version, about)]
struct Cli {
    /// Enable verbose output (log API calls and verification steps).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign a request and print the URL, headers and body to send.
    Sign(SignArgs),
    /// Verify a signed request.
    Verify(VerifyArgs),
    /// Perform a signed API call and print the response.
    Call(CallArgs),
    /// Account commands.
    #[command(subcommand)]
    Accounts(AccountsCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Sign(args) => args.execute(),
        Commands::Verify(args) => args.execute(),
        Commands::Call(args) => args.execute(),
        Commands::Accounts(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
