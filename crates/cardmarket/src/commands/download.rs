//! `cardmarket download` command implementation.

use clap::Args;

use super::ClientArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the download command.
#[derive(Args)]
pub(crate) struct DownloadArgs {
    /// API route returning a base64 file, e.g. `/priceguide` or `/stock/file`.
    route: String,
}

impl DownloadArgs {
    /// Execute the download command.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be written.
    pub(crate) fn execute(self, client_args: &ClientArgs) -> Result<(), CliError> {
        let output = Output::new();
        let client = client_args.client()?;

        match client.download(&self.route)? {
            Some(path) => {
                output.success("Download complete");
                output.result(&path.display().to_string())?;
            }
            None => output.warning("Dry run: nothing downloaded"),
        }

        Ok(())
    }
}
