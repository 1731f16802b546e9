//! Main entry point for the `awn` CLI

use ambient_weather_client::cli::logging::init_tracing;
use ambient_weather_client::cli::{Cli, CliError, Commands};
use ambient_weather_client::fetcher::context::{CancelHandle, FetchContext};
use ambient_weather_client::metrics::init_metrics;
use anyhow::Context;
use clap::Parser;
use tracing::{error, warn};

async fn run(cli: Cli, ctx: FetchContext) -> anyhow::Result<()> {
    if let Some(addr) = cli.metrics_addr {
        init_metrics(addr)
            .map_err(CliError::from)
            .with_context(|| format!("serving metrics on {addr}"))?;
    }

    match &cli.command {
        Commands::Devices(args) => args.execute(&cli, &ctx).await?,
        Commands::History(args) => args.execute(&cli, &ctx).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    let cancel = CancelHandle::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl+C received - cancelling in-flight request");
                cancel.cancel();
            }
        }
    });

    let ctx = FetchContext::new().with_cancel(cancel);

    if let Err(e) = run(cli, ctx).await {
        let kind = e.downcast_ref::<CliError>().map_or("Error", CliError::kind);
        error!("Command failed: {:#}", e);
        eprintln!("{kind}: {e:#}");
        std::process::exit(1);
    }
}
