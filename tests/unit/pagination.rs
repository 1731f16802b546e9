//! Unit tests for the historical pagination engine driven by a scripted fetcher

use ambient_weather_client::fetcher::context::FetchContext;
use ambient_weather_client::fetcher::request::{FunctionData, RequestParams};
use ambient_weather_client::fetcher::{CredentialKind, FetcherError, FetcherResult, WindowFetcher};
use ambient_weather_client::pagination::{Clock, HistoricalPaginator, DAY_MS};
use ambient_weather_client::{DeviceRecord, WindowResponse};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

const NOW: i64 = 1_704_067_200_000;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Helper struct to track fetch calls
#[derive(Clone, Default)]
struct FetchTracker {
    end_dates: Arc<Mutex<Vec<i64>>>,
    limits: Arc<Mutex<Vec<u16>>>,
    fail_with: Option<(usize, FetcherError)>,
    delay: Option<Duration>,
}

impl FetchTracker {
    fn end_dates(&self) -> Vec<i64> {
        self.end_dates.lock().unwrap().clone()
    }
}

#[async_trait]
impl WindowFetcher for FetchTracker {
    async fn fetch_window(
        &self,
        _ctx: &FetchContext,
        params: &RequestParams,
    ) -> FetcherResult<WindowResponse> {
        let index = {
            let mut end_dates = self.end_dates.lock().unwrap();
            end_dates.push(params.end_date());
            end_dates.len() - 1
        };
        self.limits.lock().unwrap().push(params.limit());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.fail_with {
            Some((at, err)) if *at == index => Err(err.clone()),
            _ => Ok((0..params.limit().min(3))
                .map(|i| DeviceRecord {
                    date_utc: params.end_date() - DAY_MS + i64::from(i) * 300_000,
                    ..Default::default()
                })
                .collect()),
        }
    }
}

fn session(start: i64, limit: u16) -> FunctionData {
    FunctionData::new("api", "app")
        .with_mac("00:11:22:33:44:55")
        .with_epoch(start)
        .with_limit(limit)
        .unwrap()
}

fn paginator(tracker: &FetchTracker) -> HistoricalPaginator<FetchTracker> {
    HistoricalPaginator::with_clock(tracker.clone(), Arc::new(FixedClock(NOW)))
}

#[tokio::test]
async fn test_window_count_matches_range() {
    for days in [1, 2, 7, 30] {
        let tracker = FetchTracker::default();
        let start = NOW - days * DAY_MS + 1;

        let records = paginator(&tracker)
            .collect(&FetchContext::new(), &session(start, 288))
            .await
            .unwrap();

        assert_eq!(tracker.end_dates().len() as i64, days, "{days} days");
        assert_eq!(records.len() as i64, days * 3);
    }
}

#[tokio::test]
async fn test_limit_is_sent_with_every_window() {
    let tracker = FetchTracker::default();
    paginator(&tracker)
        .collect(&FetchContext::new(), &session(NOW - 3 * DAY_MS, 2))
        .await
        .unwrap();

    assert_eq!(*tracker.limits.lock().unwrap(), vec![2, 2, 2, 2]);
}

#[tokio::test]
async fn test_end_dates_strictly_increase_by_one_day() {
    let tracker = FetchTracker::default();
    paginator(&tracker)
        .collect(&FetchContext::new(), &session(NOW - 10 * DAY_MS + 7, 288))
        .await
        .unwrap();

    let end_dates = tracker.end_dates();
    assert_eq!(end_dates.first(), Some(&(NOW - 10 * DAY_MS + 7)));
    assert!(end_dates.windows(2).all(|w| w[1] - w[0] == DAY_MS));
    assert!(end_dates.iter().all(|d| *d <= NOW));
}

#[tokio::test]
async fn test_remote_error_aborts_sync_mode() {
    let tracker = FetchTracker {
        fail_with: Some((
            3,
            FetcherError::InvalidDateFormat {
                message: "bad endDate".to_string(),
            },
        )),
        ..Default::default()
    };

    let result = paginator(&tracker)
        .collect(&FetchContext::new(), &session(NOW - 9 * DAY_MS, 288))
        .await;

    assert_eq!(
        result,
        Err(FetcherError::InvalidDateFormat {
            message: "bad endDate".to_string()
        })
    );
    assert_eq!(tracker.end_dates().len(), 4);
}

#[tokio::test]
async fn test_deadline_between_windows_aborts() {
    let tracker = FetchTracker {
        delay: Some(Duration::from_millis(40)),
        ..Default::default()
    };
    let ctx = FetchContext::new().with_timeout(Duration::from_millis(100));

    let result = paginator(&tracker)
        .collect(&ctx, &session(NOW - 20 * DAY_MS, 288))
        .await;

    assert_eq!(result, Err(FetcherError::ContextTimeoutExceeded));
    assert!(tracker.end_dates().len() < 20);
}

#[tokio::test]
async fn test_stream_and_collect_agree() {
    let tracker = FetchTracker::default();
    let start = NOW - 5 * DAY_MS + 1;

    let collected = paginator(&tracker)
        .collect(&FetchContext::new(), &session(start, 288))
        .await
        .unwrap();

    let (ready_tx, ready_rx) = oneshot::channel();
    let streamed: Vec<DeviceRecord> = paginator(&tracker)
        .stream(&FetchContext::new(), &session(start, 288), ready_tx)
        .unwrap()
        .map(|window| window.unwrap().records)
        .concat()
        .await;

    assert!(ready_rx.await.is_ok());
    assert_eq!(collected, streamed);
}

#[tokio::test]
async fn test_stream_of_future_start_is_empty() {
    let tracker = FetchTracker::default();
    let (ready_tx, ready_rx) = oneshot::channel();

    let mut stream = paginator(&tracker)
        .stream(&FetchContext::new(), &session(NOW + 1, 288), ready_tx)
        .unwrap();

    ready_rx.await.unwrap();
    assert!(stream.next().await.is_none());
    assert!(tracker.end_dates().is_empty());
}

#[tokio::test]
async fn test_blank_api_key_rejected_before_fetch() {
    let tracker = FetchTracker::default();
    let data = FunctionData::new("   ", "app")
        .with_mac("00:11:22:33:44:55")
        .with_epoch(NOW - DAY_MS);

    let result = paginator(&tracker)
        .collect(&FetchContext::new(), &data)
        .await;

    assert_eq!(
        result,
        Err(FetcherError::MissingCredential(CredentialKind::ApiKey))
    );
    assert!(tracker.end_dates().is_empty());
}
