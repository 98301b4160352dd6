//! # Rate-Limited Fetcher
//!
//! Issues one logical GET with bounded concurrency and throttling retries.
//!
//! ## Policy
//!
//! - At most N requests in flight across every caller sharing the slot
//!   semaphore. A caller keeps its slot for the whole retry loop.
//! - 429: wait for `Retry-After` if given, else the fallback delay, then
//!   retry, up to `max_attempts` total attempts.
//! - Transport errors: fixed backoff, same attempt budget.
//! - 404 and any other non-200 status: terminal, no retry.
//! - Optional request-rate quota: every attempt waits for a quota cell.
//!
//! The fetcher knows nothing about the domain.

mod transport;

pub use transport::{HttpTransport, RawResponse, Transport, TransportError};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Default ceiling on concurrent requests.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 10;

/// Request-rate limiter shared by all attempts of a fetcher.
pub type RequestQuota = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

// =============================================================================
// ERRORS
// =============================================================================

/// Terminal outcome of a fetch that produced no payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP 404.
    #[error("not found")]
    NotFound,

    /// Any other non-success, non-throttling status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Still throttled when the attempt budget ran out.
    #[error("throttled on all {0} attempts")]
    Throttled(u32),

    /// Transport failure on the last attempt.
    #[error("transport failure after {attempts} attempts: {detail}")]
    Transport { attempts: u32, detail: String },

    /// HTTP 200 whose body is not JSON.
    #[error("undecodable body: {0}")]
    Decode(String),

    /// The slot semaphore was closed.
    #[error("request slots closed")]
    Closed,
}

// =============================================================================
// RETRY POLICY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per fetch, including the first.
    pub max_attempts: u32,
    /// Wait after a 429 that carries no `Retry-After`.
    pub throttle_fallback: Duration,
    /// Wait after a transport error.
    pub transport_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            throttle_fallback: Duration::from_millis(1500),
            transport_backoff: Duration::from_millis(1000),
        }
    }
}

// =============================================================================
// FETCHER
// =============================================================================

pub struct Fetcher<T> {
    transport: T,
    slots: Arc<Semaphore>,
    quota: Option<Arc<RequestQuota>>,
    policy: RetryPolicy,
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher over `transport`.
    ///
    /// `slots` is the concurrency ceiling; fetchers sharing one semaphore
    /// share one ceiling.
    pub fn new(transport: T, slots: Arc<Semaphore>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            slots,
            quota: None,
            policy,
        }
    }

    /// Add a requests-per-second quota. Zero leaves the fetcher unquoted.
    #[must_use]
    pub fn with_quota(mut self, requests_per_second: u32) -> Self {
        self.quota = NonZeroU32::new(requests_per_second)
            .map(|rps| Arc::new(RateLimiter::direct(Quota::per_second(rps))));
        self
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Fetch `url` and decode its JSON body.
    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let _permit = self.slots.acquire().await.map_err(|_| FetchError::Closed)?;

        let max_attempts = self.policy.max_attempts.max(1);
        let mut last = FetchError::Throttled(0);

        for attempt in 1..=max_attempts {
            if let Some(quota) = &self.quota {
                quota.until_ready().await;
            }

            let wait = match self.transport.get(url).await {
                Ok(resp) => match resp.status {
                    200 => {
                        return serde_json::from_slice(&resp.body)
                            .map_err(|e| FetchError::Decode(e.to_string()));
                    }
                    429 => {
                        let wait = resp.retry_after.unwrap_or(self.policy.throttle_fallback);
                        tracing::warn!(url, attempt, ?wait, "Throttled by upstream");
                        last = FetchError::Throttled(attempt);
                        wait
                    }
                    404 => return Err(FetchError::NotFound),
                    status => {
                        tracing::debug!(url, status, "Upstream returned terminal status");
                        return Err(FetchError::Status(status));
                    }
                },
                Err(e) => {
                    tracing::debug!(url, attempt, error = %e, "Transport error");
                    last = FetchError::Transport {
                        attempts: attempt,
                        detail: e.to_string(),
                    };
                    self.policy.transport_backoff
                }
            };

            if attempt < max_attempts {
                tokio::time::sleep(wait).await;
            }
        }

        Err(last)
    }
}

// =============================================================================
// TESTS
// =============================================================================
