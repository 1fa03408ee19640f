//! Cardmarket CLI - signed requests against the Cardmarket API.
//!
//! Provides commands for:
//! - `get`: Send a signed GET request and print the response body
//! - `sign`: Print the request URL and `Authorization` header without sending
//! - `download`: Save a base64 file payload (price guide, stock) to disk

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ClientArgs, DownloadArgs, GetArgs, SignArgs};
use output::Output;

/// Log filter enabled by `--verbose`.
const VERBOSE_FILTER: &str = "cardmarket=debug,cardmarket_client=debug,cardmarket_config=debug";

/// Cardmarket API client.
#[derive(Parser)]
#[command(name = "cardmarket", version, about)]
struct Cli {
    #[command(flatten)]
    client: ClientArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a signed GET request.
    Get(GetArgs),
    /// Print a signed request without sending it.
    Sign(SignArgs),
    /// Download a base64 file payload into the working directory.
    Download(DownloadArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG for our crates, otherwise use RUST_LOG
    let filter = if cli.client.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Get(args) => args.execute(&cli.client),
        Commands::Sign(args) => args.execute(&cli.client),
        Commands::Download(args) => args.execute(&cli.client),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
