//! # Upstream API
//!
//! Typed calls over the fetcher: identity resolution, match history and
//! match detail.
//!
//! Only `resolve` reports failures to the caller. History and detail reads
//! degrade to "nothing" and log why, so one bad account or match never
//! interrupts a crawl.

use crate::fetcher::{FetchError, Fetcher, Transport};
use compscout_core::{
    AccountRef, ActivityRecord, ActivityRef, Identity,
    primitives::{DEFAULT_HISTORY_COUNT, DEFAULT_MODE_FILTER},
};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

/// Default regional routing host.
pub const DEFAULT_BASE_URL: &str = "https://asia.api.riotgames.com";

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The identity is empty, too long or contains control characters.
    /// No request was sent.
    #[error("Invalid identity: {0:?}")]
    InvalidIdentity(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A 200 response without the expected fields.
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

/// Result of resolving an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(AccountRef),
    /// The upstream service has no such player.
    NotFound,
}

/// Parameters of a history read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    /// Maximum activities returned.
    pub count: u32,
    /// Game-mode (queue) filter.
    pub mode: u32,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            count: DEFAULT_HISTORY_COUNT,
            mode: DEFAULT_MODE_FILTER,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct Upstream<T> {
    fetcher: Fetcher<T>,
    base: Url,
    history: HistoryQuery,
}

impl<T: Transport> Upstream<T> {
    /// Create a client rooted at `base_url`.
    pub fn new(
        fetcher: Fetcher<T>,
        base_url: &str,
        history: HistoryQuery,
    ) -> Result<Self, UpstreamError> {
        let base =
            Url::parse(base_url).map_err(|e| UpstreamError::Url(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::Url(format!("{base_url}: not a base URL")));
        }
        Ok(Self {
            fetcher,
            base,
            history,
        })
    }

    #[must_use]
    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    #[must_use]
    pub fn history(&self) -> HistoryQuery {
        self.history
    }

    /// Build `{base}/{segments...}`, percent-encoding every segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Url(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolve a player identity to its account.
    pub async fn resolve(&self, identity: &Identity) -> Result<Resolution, UpstreamError> {
        identity
            .validate()
            .map_err(|_| UpstreamError::InvalidIdentity(identity.to_string()))?;

        let url = self.endpoint(&[
            "riot",
            "account",
            "v1",
            "accounts",
            "by-riot-id",
            identity.name(),
            identity.tag(),
        ])?;

        match self.fetcher.fetch(url.as_str()).await {
            Ok(body) => body
                .get("puuid")
                .and_then(Value::as_str)
                .filter(|puuid| !puuid.is_empty())
                .map(|puuid| Resolution::Found(AccountRef::new(puuid)))
                .ok_or_else(|| UpstreamError::Malformed(format!("no account for {identity}"))),
            Err(FetchError::NotFound) => Ok(Resolution::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Most recent activities of an account, newest first.
    ///
    /// Any failure yields an empty list.
    pub async fn recent_activities(&self, account: &AccountRef) -> Vec<ActivityRef> {
        let mut url = match self.endpoint(&[
            "lol",
            "match",
            "v5",
            "matches",
            "by-puuid",
            account.as_str(),
            "ids",
        ]) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(error = %e, "Cannot build history URL");
                return Vec::new();
            }
        };
        url.query_pairs_mut()
            .append_pair("start", "0")
            .append_pair("count", &self.history.count.to_string())
            .append_pair("queue", &self.history.mode.to_string());

        let body = match self.fetcher.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "History read failed");
                return Vec::new();
            }
        };

        let Some(ids) = body.as_array() else {
            tracing::debug!("History payload is not a list");
            return Vec::new();
        };

        let mut activities: Vec<ActivityRef> = ids
            .iter()
            .filter_map(Value::as_str)
            .map(ActivityRef::new)
            .collect();
        activities.truncate(self.history.count as usize);
        activities
    }

    /// Full detail of one activity, or `None` if it cannot be fetched or
    /// decoded.
    pub async fn detail(&self, activity: &ActivityRef) -> Option<ActivityRecord> {
        let url = self
            .endpoint(&["lol", "match", "v5", "matches", activity.as_str()])
            .ok()?;

        let body = match self.fetcher.fetch(url.as_str()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(activity = %activity, error = %e, "Detail fetch failed");
                return None;
            }
        };

        match ActivityRecord::from_json(body) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(activity = %activity, error = %e, "Dropping malformed record");
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
