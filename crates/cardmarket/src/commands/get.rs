//! `cardmarket get` command implementation.

use clap::Args;

use super::{ClientArgs, parse_query_param};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the get command.
#[derive(Args)]
pub(crate) struct GetArgs {
    /// API route, e.g. `/account` or `/products/find`.
    route: String,

    /// Query parameter as key=value (repeatable).
    #[arg(short, long = "query", value_parser = parse_query_param)]
    query: Vec<(String, String)>,
}

impl GetArgs {
    /// Execute the get command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the request fails.
    pub(crate) fn execute(self, client_args: &ClientArgs) -> Result<(), CliError> {
        let output = Output::new();
        let client = client_args.client()?;

        match client.get(&self.route, &self.query)? {
            Some(body) => output.result(&body.to_string())?,
            None => output.warning("Dry run: request was signed but not sent"),
        }

        Ok(())
    }
}
