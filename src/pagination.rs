//! Historical pagination engine
//!
//! Walks a device's history in fixed 24-hour steps. Each checkpoint is the end
//! boundary of one window; the engine fetches one window per checkpoint, oldest
//! first, until the checkpoint passes the current wall-clock time. "Now" is
//! sampled fresh before every window, so a long session picks up windows that
//! did not exist when it started.
//!
//! Two modes share the same checkpoint sequence:
//! - [`HistoricalPaginator::collect`] accumulates every record and fails fast:
//!   the first window error aborts the session and no partial result is returned.
//! - [`HistoricalPaginator::stream`] runs one background producer that hands
//!   each window over a single-slot channel. A failure is delivered as the last
//!   item before the stream ends.
//!
//! At most one request is in flight per session. Spacing between requests is
//! enforced by the transport's rate limiter.

use chrono::Utc;
use futures_util::stream;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::fetcher::context::FetchContext;
use crate::fetcher::request::{FunctionData, RequestParams};
use crate::fetcher::{FetcherResult, Window, WindowFetcher, WindowStream};
use crate::{metrics, DeviceRecord, WindowResponse};

/// Width of one window in milliseconds. Wall-clock naive: no DST or leap seconds.
pub const DAY_MS: i64 = 86_400_000;

/// Source of the current time in milliseconds since the Unix epoch
pub trait Clock: Send + Sync {
    /// Current time (ms)
    fn now_millis(&self) -> i64;
}

/// The system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Lazy sequence of window checkpoints: `start`, `start + DAY_MS`, ... while `<= now`
pub struct Checkpoints {
    next: Option<i64>,
    clock: Arc<dyn Clock>,
}

impl Checkpoints {
    /// Checkpoints from `start`, compared against `clock` on every step
    pub fn new(start: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            next: Some(start),
            clock,
        }
    }
}

impl Iterator for Checkpoints {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let current = self.next?;
        if current > self.clock.now_millis() {
            self.next = None;
            return None;
        }
        self.next = current.checked_add(DAY_MS);
        Some(current)
    }
}

/// Drives a [`WindowFetcher`] across a session's checkpoints
pub struct HistoricalPaginator<F> {
    fetcher: Arc<F>,
    clock: Arc<dyn Clock>,
}

impl<F> Clone for HistoricalPaginator<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<F: WindowFetcher + 'static> HistoricalPaginator<F> {
    /// Paginate with the system clock
    pub fn new(fetcher: F) -> Self {
        Self::with_clock(fetcher, Arc::new(SystemClock))
    }

    /// Paginate against a custom clock
    pub fn with_clock(fetcher: F, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            clock,
        }
    }

    /// Checkpoint sequence starting at `start`
    pub fn checkpoints(&self, start: i64) -> Checkpoints {
        Checkpoints::new(start, self.clock.clone())
    }

    /// Fetch every window from `data.epoch` up to now and return all records in order
    ///
    /// A start in the future yields an empty result. Empty windows are normal.
    ///
    /// # Errors
    /// Request-building errors before any request, otherwise the first window
    /// failure. Records gathered before the failure are discarded.
    pub async fn collect(
        &self,
        ctx: &FetchContext,
        data: &FunctionData,
    ) -> FetcherResult<Vec<DeviceRecord>> {
        RequestParams::from_function_data(data)?;

        info!(
            mac = %data.mac,
            start = data.epoch,
            limit = data.limit,
            "Starting historical pagination"
        );

        let mut all_records = Vec::new();
        let mut windows = 0usize;

        for checkpoint in self.checkpoints(data.epoch) {
            let records = Self::fetch_one(&*self.fetcher, ctx, data, checkpoint)
                .await
                .inspect_err(|e| {
                    metrics::record_pagination_failure(e.kind());
                    warn!(checkpoint, windows, "Pagination aborted: {}", e);
                })?;

            all_records.extend(records);
            windows += 1;
        }

        info!(windows, records = all_records.len(), "Historical pagination complete");
        Ok(all_records)
    }

    /// Stream windows from `data.epoch` up to now, oldest first
    ///
    /// One producer task fetches the windows and hands them over a channel with
    /// a single slot, so it never runs more than one window ahead of the
    /// consumer. `ready` is fired once the producer has been spawned. Dropping
    /// the stream stops the producer after its current request.
    ///
    /// # Errors
    /// Request-building errors, before anything is spawned. `ready` is then
    /// dropped without a value.
    pub fn stream(
        &self,
        ctx: &FetchContext,
        data: &FunctionData,
        ready: oneshot::Sender<()>,
    ) -> FetcherResult<WindowStream> {
        RequestParams::from_function_data(data)?;

        let (tx, rx) = mpsc::channel::<FetcherResult<Window>>(1);
        let fetcher = self.fetcher.clone();
        let checkpoints = self.checkpoints(data.epoch);
        let ctx = ctx.clone();
        let data = data.clone();

        info!(
            mac = %data.mac,
            start = data.epoch,
            limit = data.limit,
            "Starting historical stream"
        );

        tokio::spawn(async move {
            let mut windows = 0usize;
            for checkpoint in checkpoints {
                match Self::fetch_one(&*fetcher, &ctx, &data, checkpoint).await {
                    Ok(records) => {
                        let window = Window {
                            checkpoint,
                            records,
                        };
                        if tx.send(Ok(window)).await.is_err() {
                            debug!(windows, "Stream consumer dropped, stopping");
                            return;
                        }
                        windows += 1;
                    }
                    Err(e) => {
                        metrics::record_pagination_failure(e.kind());
                        warn!(checkpoint, windows, "Stream aborted: {}", e);
                        let _ = tx.send(Err(e)).await;
                        return;
                    }
                }
            }
            info!(windows, "Historical stream complete");
        });

        let _ = ready.send(());

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }

    async fn fetch_one(
        fetcher: &F,
        ctx: &FetchContext,
        data: &FunctionData,
        checkpoint: i64,
    ) -> FetcherResult<WindowResponse> {
        ctx.check()?;
        let params = RequestParams::for_window(data, checkpoint)?;

        debug!(checkpoint, "Fetching window");
        let records = fetcher.fetch_window(ctx, &params).await?;

        metrics::record_window(records.len());
        Ok(records)
    }
}
