//! `awn devices`: latest snapshot of every device on the account

use clap::Args;
use std::io::Write;
use tracing::info;

use super::{Cli, CliError};
use crate::fetcher::context::FetchContext;

/// Arguments for the device listing
#[derive(Args, Debug)]
pub struct DevicesArgs {
    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl DevicesArgs {
    /// Fetch the device list and print it to stdout as a JSON array
    ///
    /// # Errors
    /// Missing credentials, transport or remote errors, or a failed write
    pub async fn execute(&self, cli: &Cli, ctx: &FetchContext) -> Result<(), CliError> {
        let client = cli.client()?;
        let devices = client.fetch_latest(ctx, cli.api_key(), cli.app_key()).await?;

        for device in &devices {
            info!(
                mac = %device.mac_address,
                name = device.info.name.as_deref().unwrap_or(""),
                "Device"
            );
        }

        let mut stdout = std::io::stdout().lock();
        if self.pretty {
            serde_json::to_writer_pretty(&mut stdout, &devices)?;
        } else {
            serde_json::to_writer(&mut stdout, &devices)?;
        }
        writeln!(stdout)?;
        Ok(())
    }
}
