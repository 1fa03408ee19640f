//! `cardmarket sign` command implementation.

use cardmarket_client::HttpMethod;
use clap::Args;

use super::{ClientArgs, parse_query_param};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sign command.
#[derive(Args)]
pub(crate) struct SignArgs {
    /// API route, e.g. `/account` or `/products/find`.
    route: String,

    /// HTTP method to sign for.
    #[arg(short = 'X', long, default_value = "GET")]
    method: HttpMethod,

    /// Query parameter as key=value (repeatable).
    #[arg(short, long = "query", value_parser = parse_query_param)]
    query: Vec<(String, String)>,
}

impl SignArgs {
    /// Execute the sign command: print URL and `Authorization` header
    /// without sending anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid.
    pub(crate) fn execute(self, client_args: &ClientArgs) -> Result<(), CliError> {
        let output = Output::new();
        let client = client_args.client()?;

        let signed = client.sign(self.method, &self.route, &self.query);
        output.field("Method", signed.method.as_str())?;
        output.field("URL", &signed.url)?;
        output.field("Authorization", &signed.authorization)?;

        Ok(())
    }
}
