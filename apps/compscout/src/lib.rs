//! # compscout
//!
//! The async half of compscout - THE BINARY's library.
//!
//! - `fetcher` - bounded, throttling-aware GET over a pluggable transport
//! - `upstream` - identity resolution, history and detail calls
//! - `crawler` - the frontier crawl driver
//! - `harvest` - seed-list growth from one player's recent activities
//! - `config` - layered settings
//!
//! Domain logic lives in `compscout-core`; this crate only moves data
//! between the network and it.

pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod harvest;
pub mod upstream;

pub use config::Config;
pub use crawler::{CrawlPhase, CrawlSettings, Crawler, CycleReport};
pub use error::AppError;
pub use fetcher::{FetchError, Fetcher, HttpTransport, RawResponse, RetryPolicy, Transport};
pub use harvest::{HarvestReport, harvest, pick_source};
pub use upstream::{HistoryQuery, Resolution, Upstream, UpstreamError};
