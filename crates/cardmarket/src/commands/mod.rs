//! CLI command implementations.

pub(crate) mod download;
pub(crate) mod get;
pub(crate) mod sign;

use std::path::PathBuf;

use cardmarket_client::{CardmarketClient, Environment, ResponseFormat};
use cardmarket_config::{CliSettings, Config};
use clap::Args;
use tracing::debug;

use crate::error::CliError;

pub(crate) use download::DownloadArgs;
pub(crate) use get::GetArgs;
pub(crate) use sign::SignArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct ClientArgs {
    /// Path to configuration file (default: auto-discover cardmarket.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use the sandbox API instead of production.
    #[arg(long, global = true)]
    sandbox: bool,

    /// Request XML responses instead of JSON.
    #[arg(long, global = true)]
    xml: bool,

    /// Sign and log requests without sending them.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Directory for downloaded files (default: from config).
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// Enable debug logging of URLs, base strings and signatures.
    #[arg(short, long, global = true)]
    pub(crate) verbose: bool,
}

impl ClientArgs {
    /// Convert flags into config overrides. Unset flags keep config values.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            environment: self.sandbox.then_some(Environment::Sandbox),
            response_format: self.xml.then_some(ResponseFormat::Xml),
            dry_run: self.dry_run.then_some(true),
            work_dir: self.work_dir.clone(),
        }
    }

    /// Load configuration and build a client from it.
    pub(crate) fn client(&self) -> Result<CardmarketClient, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        debug!(
            config_path = ?config.config_path,
            environment = %config.api.environment,
            dry_run = config.api.dry_run,
            "Loaded configuration"
        );
        Ok(CardmarketClient::from_config(&config)?)
    }
}

/// Parse a `key=value` query parameter.
pub(crate) fn parse_query_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
