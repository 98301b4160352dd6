//! # Configuration
//!
//! Layered settings for the binary. Later layers override earlier ones:
//!
//! 1. built-in defaults
//! 2. TOML file (`--config PATH`, or `compscout.toml` when present)
//! 3. environment (`COMPSCOUT_API_KEY` / `RIOT_API_KEY`, `COMPSCOUT_BASE_URL`,
//!    `SEED_GAME_NAME`, `SEED_TAG_LINE`)
//! 4. command-line flags, applied by the command that uses them
//!
//! ```toml
//! [api]
//! base_url = "https://asia.api.riotgames.com"
//! max_in_flight = 10
//!
//! [crawl]
//! seed_game_name = "Hide on bush"
//! seed_tag_line = "KR1"
//! visit_cap = 200
//!
//! [paths]
//! store = "team_data.csv"
//! ```

use crate::crawler::{
    CrawlSettings, DEFAULT_BATCH_SIZE, DEFAULT_CYCLE_PAUSE, DEFAULT_MAX_QUEUE_LEN,
};
use crate::error::AppError;
use crate::fetcher::{DEFAULT_MAX_IN_FLIGHT, RetryPolicy};
use crate::upstream::{DEFAULT_BASE_URL, HistoryQuery};
use compscout_core::{
    Identity,
    primitives::{DEFAULT_CYCLE_VISIT_CAP, DEFAULT_HISTORY_COUNT, DEFAULT_MODE_FILTER},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "compscout.toml";

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,
    pub crawl: CrawlConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Secret token. Prefer the environment over the file.
    pub api_key: Option<String>,
    pub base_url: String,
    pub auth_header: String,
    pub timeout_secs: u64,
    pub max_in_flight: usize,
    /// Requests per second across all attempts. 0 disables the quota.
    pub requests_per_second: u32,
    pub max_attempts: u32,
    pub throttle_fallback_ms: u64,
    pub transport_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_header: "X-Riot-Token".to_string(),
            timeout_secs: 10,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            requests_per_second: 0,
            max_attempts: retry.max_attempts,
            throttle_fallback_ms: retry.throttle_fallback.as_millis() as u64,
            transport_backoff_ms: retry.transport_backoff.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    pub seed_game_name: Option<String>,
    pub seed_tag_line: Option<String>,
    pub visit_cap: usize,
    pub batch_size: usize,
    pub max_queue_len: usize,
    pub carry_over_frontier: bool,
    pub cycle_pause_secs: u64,
    pub history_count: u32,
    pub mode_filter: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_game_name: None,
            seed_tag_line: None,
            visit_cap: DEFAULT_CYCLE_VISIT_CAP,
            batch_size: DEFAULT_BATCH_SIZE,
            max_queue_len: DEFAULT_MAX_QUEUE_LEN,
            carry_over_frontier: true,
            cycle_pause_secs: DEFAULT_CYCLE_PAUSE.as_secs(),
            history_count: DEFAULT_HISTORY_COUNT,
            mode_filter: DEFAULT_MODE_FILTER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Sample store.
    pub store: PathBuf,
    /// Persona → role table.
    pub roles: PathBuf,
    /// Seed list used by `harvest` and pruned by `crawl`.
    pub seed_list: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from("team_data.csv"),
            roles: PathBuf::from("lol_labeling_en.csv"),
            seed_list: PathBuf::from("user_list.csv"),
        }
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl Config {
    /// Load defaults overlaid with a TOML file.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(AppError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_toml(&text)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay values from the process environment.
    pub fn apply_process_env(&mut self) {
        self.apply_env(|key| std::env::var(key).ok());
    }

    /// Overlay values from `lookup`. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("COMPSCOUT_API_KEY").or_else(|| get("RIOT_API_KEY")) {
            self.api.api_key = Some(key);
        }
        if let Some(url) = get("COMPSCOUT_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(name) = get("SEED_GAME_NAME") {
            self.crawl.seed_game_name = Some(name);
        }
        if let Some(tag) = get("SEED_TAG_LINE") {
            self.crawl.seed_tag_line = Some(tag);
        }
    }

    /// Reject settings no command can run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let checks = [
            (self.api.max_in_flight == 0, "api.max_in_flight must be at least 1"),
            (self.api.max_attempts == 0, "api.max_attempts must be at least 1"),
            (self.api.timeout_secs == 0, "api.timeout_secs must be at least 1"),
            (self.crawl.visit_cap == 0, "crawl.visit_cap must be at least 1"),
            (self.crawl.batch_size == 0, "crawl.batch_size must be at least 1"),
            (self.crawl.history_count == 0, "crawl.history_count must be at least 1"),
        ];
        if let Some((_, message)) = checks.iter().find(|(failed, _)| *failed) {
            return Err(AppError::Config((*message).to_string()));
        }
        reqwest::Url::parse(&self.api.base_url)
            .map_err(|e| AppError::Config(format!("api.base_url: {e}")))?;
        Ok(())
    }

    // =========================================================================
    // DERIVED SETTINGS
    // =========================================================================

    pub fn api_key(&self) -> Result<&str, AppError> {
        self.api.api_key.as_deref().ok_or_else(|| {
            AppError::Config("no API key: set RIOT_API_KEY or COMPSCOUT_API_KEY".to_string())
        })
    }

    /// The configured seed identity.
    pub fn seed(&self) -> Result<Identity, AppError> {
        let (Some(name), Some(tag)) = (&self.crawl.seed_game_name, &self.crawl.seed_tag_line)
        else {
            return Err(AppError::Config(
                "no seed: set SEED_GAME_NAME and SEED_TAG_LINE".to_string(),
            ));
        };
        let seed = Identity::new(name, tag);
        seed.validate()
            .map_err(|e| AppError::Config(format!("seed: {e}")))?;
        Ok(seed)
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.api.max_attempts,
            throttle_fallback: Duration::from_millis(self.api.throttle_fallback_ms),
            transport_backoff: Duration::from_millis(self.api.transport_backoff_ms),
        }
    }

    #[must_use]
    pub fn history_query(&self) -> HistoryQuery {
        HistoryQuery {
            count: self.crawl.history_count,
            mode: self.crawl.mode_filter,
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Crawl settings starting from `seed`. `max_cycles` is left unbounded.
    #[must_use]
    pub fn crawl_settings(&self, seed: Identity) -> CrawlSettings {
        CrawlSettings {
            seed,
            visit_cap: self.crawl.visit_cap,
            batch_size: self.crawl.batch_size,
            max_queue_len: self.crawl.max_queue_len,
            carry_over: self.crawl.carry_over_frontier,
            cycle_pause: Duration::from_secs(self.crawl.cycle_pause_secs),
            max_cycles: None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
