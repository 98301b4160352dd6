//! Integration tests for the rate-limited fetcher.
//!
//! Mock transports stand in for the network so that attempts, waits and
//! in-flight counts can be observed directly.

#![allow(clippy::unwrap_used, clippy::panic)]

use async_trait::async_trait;
use compscout::{FetchError, Fetcher, RawResponse, RetryPolicy, Transport};
use compscout::fetcher::TransportError;
use futures::future::join_all;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

// =============================================================================
// MOCK TRANSPORTS
// =============================================================================

/// Records the highest number of overlapping `get` calls.
#[derive(Default)]
struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for Gauge {
    async fn get(&self, _url: &str) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(RawResponse::json(&json!({ "ok": true })))
    }
}

/// Replays a script of replies in order, then answers 500.
struct Scripted {
    replies: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    calls: AtomicUsize,
}

impl Scripted {
    fn new(replies: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for Scripted {
    async fn get(&self, _url: &str) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(RawResponse::status(500)))
    }
}

fn policy(throttle_fallback: Duration) -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        throttle_fallback,
        transport_backoff: Duration::ZERO,
    }
}

fn scripted(replies: Vec<Result<RawResponse, TransportError>>) -> Fetcher<Scripted> {
    Fetcher::new(
        Scripted::new(replies),
        Arc::new(Semaphore::new(10)),
        policy(Duration::ZERO),
    )
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[tokio::test]
async fn in_flight_requests_never_exceed_slots() {
    let fetcher = Fetcher::new(
        Gauge::default(),
        Arc::new(Semaphore::new(2)),
        RetryPolicy::default(),
    );

    let urls: Vec<String> = (0..10).map(|i| format!("http://mock.local/{i}")).collect();
    let results = join_all(urls.iter().map(|u| fetcher.fetch(u))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(fetcher.transport().calls.load(Ordering::SeqCst), 10);
    assert!(fetcher.transport().peak.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn fetchers_sharing_slots_share_the_ceiling() {
    let slots = Arc::new(Semaphore::new(3));
    let gauge = Arc::new(Gauge::default());

    struct Shared(Arc<Gauge>);

    #[async_trait]
    impl Transport for Shared {
        async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
            self.0.get(url).await
        }
    }

    let a = Fetcher::new(Shared(gauge.clone()), slots.clone(), RetryPolicy::default());
    let b = Fetcher::new(Shared(gauge.clone()), slots, RetryPolicy::default());

    let left = join_all((0..6).map(|_| a.fetch("http://mock.local/a")));
    let right = join_all((0..6).map(|_| b.fetch("http://mock.local/b")));
    let (left, right) = futures::join!(left, right);

    assert_eq!(left.len() + right.len(), 12);
    assert!(gauge.peak.load(Ordering::SeqCst) <= 3);
}

// =============================================================================
// RETRIES
// =============================================================================

#[tokio::test]
async fn throttled_twice_then_success() {
    let fetcher = scripted(vec![
        Ok(RawResponse::throttled(None)),
        Ok(RawResponse::throttled(None)),
        Ok(RawResponse::json(&json!({ "puuid": "ACC1" }))),
    ]);

    let body = fetcher.fetch("http://mock.local/x").await.unwrap();
    assert_eq!(body, json!({ "puuid": "ACC1" }));
    assert_eq!(fetcher.transport().calls(), 3);
}

#[tokio::test]
async fn retry_after_is_honored() {
    let fetcher = scripted(vec![
        Ok(RawResponse::throttled(Some(Duration::from_secs(1)))),
        Ok(RawResponse::json(&json!([]))),
    ]);

    let started = Instant::now();
    assert_eq!(fetcher.fetch("http://mock.local/x").await, Ok(json!([])));
    assert!(started.elapsed() >= Duration::from_millis(950));
}

#[tokio::test]
async fn fallback_delay_without_retry_after() {
    let fetcher = Fetcher::new(
        Scripted::new(vec![
            Ok(RawResponse::throttled(None)),
            Ok(RawResponse::json(&json!([]))),
        ]),
        Arc::new(Semaphore::new(1)),
        policy(Duration::from_millis(200)),
    );

    let started = Instant::now();
    assert!(fetcher.fetch("http://mock.local/x").await.is_ok());
    assert!(started.elapsed() >= Duration::from_millis(190));
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let fetcher = scripted(vec![Ok(RawResponse::status(500))]);
    assert_eq!(
        fetcher.fetch("http://mock.local/x").await,
        Err(FetchError::Status(500))
    );
    assert_eq!(fetcher.transport().calls(), 1);
}

#[tokio::test]
async fn not_found_is_terminal() {
    let fetcher = scripted(vec![Ok(RawResponse::status(404))]);
    assert_eq!(
        fetcher.fetch("http://mock.local/x").await,
        Err(FetchError::NotFound)
    );
    assert_eq!(fetcher.transport().calls(), 1);
}

#[tokio::test]
async fn transport_error_then_success() {
    let fetcher = scripted(vec![
        Err(TransportError::Timeout),
        Ok(RawResponse::json(&json!(["M1"]))),
    ]);
    assert_eq!(
        fetcher.fetch("http://mock.local/x").await,
        Ok(json!(["M1"]))
    );
    assert_eq!(fetcher.transport().calls(), 2);
}

#[tokio::test]
async fn quota_spaces_requests() {
    let fetcher = Fetcher::new(
        Gauge::default(),
        Arc::new(Semaphore::new(10)),
        RetryPolicy::default(),
    )
    .with_quota(2);

    let started = Instant::now();
    for _ in 0..3 {
        assert!(fetcher.fetch("http://mock.local/q").await.is_ok());
    }
    // Burst of two, then one cell every 500 ms.
    assert!(started.elapsed() >= Duration::from_millis(400));
}
