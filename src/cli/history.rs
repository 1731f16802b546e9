//! `awn history`: a device's records from a start date up to now
//!
//! Records are written as JSON lines, oldest first. Without `--stream` every
//! window is fetched before anything is written, and a failure writes nothing.
//! With `--stream` each window is written as soon as it arrives.
//!
//! An `--output` file is written through a temporary file in the same
//! directory and only replaces the target once the session succeeds, so a
//! failed run leaves any existing file untouched.

use chrono::DateTime;
use clap::Args;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::oneshot;
use tracing::{debug, info};

use super::{Cli, CliError};
use crate::epoch::convert;
use crate::fetcher::awn::AwnClient;
use crate::fetcher::context::FetchContext;
use crate::fetcher::request::{FunctionData, MAX_LIMIT};
use crate::DeviceRecord;

/// Arguments for the history download
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Device MAC address
    #[arg(long)]
    pub mac: String,

    /// First day to fetch (YYYY-MM-DD, UTC midnight)
    #[arg(long)]
    pub start: String,

    /// Records per 24-hour window (range: 1-288)
    #[arg(
        long,
        default_value_t = MAX_LIMIT,
        value_parser = clap::value_parser!(u16).range(1..=288)
    )]
    pub limit: u16,

    /// Write each window as soon as it is fetched
    #[arg(long, default_value_t = false)]
    pub stream: bool,

    /// Output file (default: stdout)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl HistoryArgs {
    /// Build the session and write its records
    ///
    /// # Errors
    /// A malformed start date, invalid session fields, the first window failure,
    /// or a failed write
    pub async fn execute(&self, cli: &Cli, ctx: &FetchContext) -> Result<(), CliError> {
        let start = convert(&self.start)?;
        let data = FunctionData::new(cli.api_key(), cli.app_key())
            .with_mac(self.mac.as_str())
            .with_epoch(start)
            .with_limit(self.limit)?;
        debug!(session = %data, "History session");

        let client = cli.client()?;
        let mut output = Output::open(self.output.as_deref())?;

        let written = if self.stream {
            stream_history(&client, ctx, &data, output.writer()).await?
        } else {
            let records = client.history(ctx, &data).await?;
            write_records(output.writer(), &records)?
        };
        output.commit()?;

        info!(records = written, "History written");
        Ok(())
    }
}

async fn stream_history(
    client: &AwnClient,
    ctx: &FetchContext,
    data: &FunctionData,
    writer: &mut dyn Write,
) -> Result<usize, CliError> {
    let (ready_tx, ready_rx) = oneshot::channel();
    let mut windows = client.history_stream(ctx, data, ready_tx)?;
    if ready_rx.await.is_ok() {
        debug!("Stream producer running");
    }

    let spinner = create_spinner();
    let mut window_count = 0usize;
    let mut written = 0usize;

    while let Some(item) = windows.next().await {
        let window = match item {
            Ok(window) => window,
            Err(e) => {
                spinner.abandon_with_message(format!(
                    "failed after {window_count} windows, {written} records"
                ));
                return Err(e.into());
            }
        };

        written += write_records(writer, &window.records)?;
        window_count += 1;
        spinner.set_message(format!(
            "{window_count} windows, {written} records, through {}",
            format_checkpoint(window.checkpoint)
        ));
    }

    spinner.finish_with_message(format!("{window_count} windows, {written} records"));
    Ok(written)
}

fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

fn format_checkpoint(checkpoint: i64) -> String {
    DateTime::from_timestamp_millis(checkpoint)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| checkpoint.to_string())
}

/// Destination of the JSON lines
enum Output {
    Stdout(BufWriter<Stdout>),
    /// Staged next to `path`; dropped without [`Output::commit`] it is deleted
    File {
        staged: BufWriter<NamedTempFile>,
        path: PathBuf,
    },
}

impl Output {
    fn open(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::Stdout(BufWriter::new(std::io::stdout())));
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = NamedTempFile::new_in(dir)?;
        debug!(staged = ?staged.path(), target = ?path, "Staging output");

        Ok(Self::File {
            staged: BufWriter::new(staged),
            path: path.to_path_buf(),
        })
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(writer) => writer,
            Self::File { staged, .. } => staged,
        }
    }

    /// Flush, and move a staged file over its target
    fn commit(self) -> Result<(), CliError> {
        match self {
            Self::Stdout(mut writer) => writer.flush()?,
            Self::File { staged, path } => {
                let staged = staged.into_inner().map_err(|e| e.into_error())?;
                staged.as_file().sync_all()?;
                staged.persist(&path).map_err(|e| e.error)?;
            }
        }
        Ok(())
    }
}

/// Write one JSON line per record, returning how many were written
fn write_records(writer: &mut dyn Write, records: &[DeviceRecord]) -> Result<usize, CliError> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(records.len())
}
