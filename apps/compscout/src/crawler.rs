//! # Frontier Crawler
//!
//! The single driver of a crawl. Each cycle runs:
//!
//! ```text
//! Idle → Seeding → Expanding → CycleComplete → (pause) → Seeding …
//! ```
//!
//! During expansion the driver pops a batch of identities, polls their
//! resolve → history → detail chains concurrently, and only then, back on
//! the driver, runs extraction, dedup, persistence and enqueueing in queue
//! order. Fetch futures return data and never touch shared state, so a
//! cancelled cycle cannot leave a partial row behind.
//!
//! Per-identity failures are logged and abandoned. Only store and seed-list
//! I/O faults end the run.

use crate::fetcher::Transport;
use crate::upstream::{Resolution, Upstream, UpstreamError};
use compscout_core::{
    ActivityRecord, DedupStore, Frontier, Identity, RoleTable, SampleSink, ScoutError, SeedList,
    TeamExtractor, primitives::DEFAULT_CYCLE_VISIT_CAP,
};
use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;

/// Default identities popped per expansion step.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default bound on queued identities.
pub const DEFAULT_MAX_QUEUE_LEN: usize = 50_000;

/// Default pause between cycles.
pub const DEFAULT_CYCLE_PAUSE: Duration = Duration::from_secs(60);

// =============================================================================
// SETTINGS & REPORTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    /// Identity every cycle starts from.
    pub seed: Identity,
    /// Identities processed per cycle.
    pub visit_cap: usize,
    /// Identities explored concurrently per expansion step.
    pub batch_size: usize,
    pub max_queue_len: usize,
    /// Keep the unvisited backlog across cycles.
    pub carry_over: bool,
    pub cycle_pause: Duration,
    /// Stop after this many cycles. `None` runs until shutdown.
    pub max_cycles: Option<u64>,
}

impl CrawlSettings {
    #[must_use]
    pub fn new(seed: Identity) -> Self {
        Self {
            seed,
            visit_cap: DEFAULT_CYCLE_VISIT_CAP,
            batch_size: DEFAULT_BATCH_SIZE,
            max_queue_len: DEFAULT_MAX_QUEUE_LEN,
            carry_over: true,
            cycle_pause: DEFAULT_CYCLE_PAUSE,
            max_cycles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Seeding,
    Expanding,
    CycleComplete,
}

/// Counters for one cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub identities_visited: usize,
    pub not_found: usize,
    pub failures: usize,
    pub activities: usize,
    pub records: usize,
    pub samples_written: usize,
    pub duplicates: usize,
    pub sides_skipped: usize,
    pub enqueued: usize,
}

/// What exploring one identity produced.
enum Exploration {
    Visited {
        identity: Identity,
        activities: usize,
        records: Vec<ActivityRecord>,
    },
    NotFound(Identity),
    Failed {
        identity: Identity,
        error: UpstreamError,
    },
}

// =============================================================================
// CRAWLER
// =============================================================================

pub struct Crawler<T> {
    upstream: Upstream<T>,
    roles: RoleTable,
    sink: SampleSink,
    dedup: DedupStore,
    frontier: Frontier,
    seeds: Option<SeedList>,
    settings: CrawlSettings,
    phase: CrawlPhase,
    cycles: u64,
}

impl<T: Transport> Crawler<T> {
    /// Create a crawler, seeding the dedup store from the sample store.
    pub fn new(
        upstream: Upstream<T>,
        roles: RoleTable,
        sink: SampleSink,
        settings: CrawlSettings,
    ) -> Result<Self, ScoutError> {
        let dedup = DedupStore::seeded(sink.load_keys()?);
        tracing::info!(
            store = %sink.path().display(),
            known_samples = dedup.len(),
            "Dedup store seeded"
        );
        let frontier = Frontier::new(settings.visit_cap, settings.max_queue_len);

        Ok(Self {
            upstream,
            roles,
            sink,
            dedup,
            frontier,
            seeds: None,
            settings,
            phase: CrawlPhase::Idle,
            cycles: 0,
        })
    }

    /// Prune not-found identities from `seeds` as well.
    #[must_use]
    pub fn with_seed_list(mut self, seeds: SeedList) -> Self {
        self.seeds = Some(seeds);
        self
    }

    #[must_use]
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Completed cycles.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[must_use]
    pub fn dedup_len(&self) -> usize {
        self.dedup.len()
    }

    #[must_use]
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    #[must_use]
    pub fn seed_list(&self) -> Option<&SeedList> {
        self.seeds.as_ref()
    }

    /// Run cycles until shutdown is signalled or `max_cycles` is reached.
    ///
    /// Returns the number of completed cycles.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<u64, ScoutError> {
        loop {
            if self.reached_max_cycles() || *shutdown.borrow() {
                break;
            }

            tokio::select! {
                biased;
                () = shutdown_signalled(&mut shutdown) => {
                    tracing::info!(cycle = self.cycles + 1, "Shutdown during cycle");
                    break;
                }
                report = self.run_cycle() => {
                    report?;
                }
            }

            if self.reached_max_cycles() {
                break;
            }

            tracing::debug!(pause = ?self.settings.cycle_pause, "Pausing before next cycle");
            tokio::select! {
                biased;
                () = shutdown_signalled(&mut shutdown) => break,
                () = tokio::time::sleep(self.settings.cycle_pause) => {}
            }
        }

        self.phase = CrawlPhase::Idle;
        tracing::info!(cycles = self.cycles, "Crawl stopped");
        Ok(self.cycles)
    }

    /// Run one full cycle from the seed.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, ScoutError> {
        let mut report = CycleReport {
            cycle: self.cycles + 1,
            ..CycleReport::default()
        };

        self.phase = CrawlPhase::Seeding;
        let seed = self.settings.seed.clone();
        if !self.frontier.begin_cycle(seed.clone(), self.settings.carry_over) {
            tracing::warn!(seed = %seed, "Seed identity was pruned; cycle runs on backlog only");
        }

        self.phase = CrawlPhase::Expanding;
        loop {
            let batch = self.frontier.next_batch(self.settings.batch_size.max(1));
            if batch.is_empty() {
                break;
            }

            let upstream = &self.upstream;
            let explored = join_all(batch.into_iter().map(|id| explore(upstream, id))).await;

            for exploration in explored {
                self.absorb(exploration, &mut report)?;
            }
        }

        self.phase = CrawlPhase::CycleComplete;
        self.cycles += 1;
        tracing::info!(
            cycle = report.cycle,
            visited = report.identities_visited,
            written = report.samples_written,
            duplicates = report.duplicates,
            skipped_sides = report.sides_skipped,
            not_found = report.not_found,
            failures = report.failures,
            queued = self.frontier.queued(),
            known_samples = self.dedup.len(),
            "Cycle complete"
        );
        Ok(report)
    }

    fn reached_max_cycles(&self) -> bool {
        self.settings
            .max_cycles
            .is_some_and(|max| self.cycles >= max)
    }

    /// Fold one exploration into crawl state.
    fn absorb(
        &mut self,
        exploration: Exploration,
        report: &mut CycleReport,
    ) -> Result<(), ScoutError> {
        report.identities_visited += 1;

        match exploration {
            Exploration::NotFound(identity) => {
                report.not_found += 1;
                self.frontier.prune(&identity);
                let dropped = match self.seeds.as_mut() {
                    Some(seeds) => seeds.prune(&identity)?,
                    None => false,
                };
                tracing::info!(
                    identity = %identity,
                    seed_list = dropped,
                    "Pruned unknown identity"
                );
            }
            Exploration::Failed { identity, error } => {
                report.failures += 1;
                tracing::warn!(
                    identity = %identity,
                    error = %error,
                    "Identity abandoned for this cycle"
                );
            }
            Exploration::Visited {
                identity,
                activities,
                records,
            } => {
                tracing::debug!(
                    identity = %identity,
                    activities,
                    records = records.len(),
                    "Identity explored"
                );
                report.activities += activities;
                for record in &records {
                    report.records += 1;
                    self.persist(record, report)?;
                    for participant in record.identities() {
                        if self.frontier.enqueue(participant.clone()) {
                            report.enqueued += 1;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Extract, dedup and append the samples of one record.
    ///
    /// A key is recorded only after its row has been written.
    fn persist(
        &mut self,
        record: &ActivityRecord,
        report: &mut CycleReport,
    ) -> Result<(), ScoutError> {
        let extraction = TeamExtractor::extract(record, &self.roles);

        for (side, reason) in extraction.skipped() {
            report.sides_skipped += 1;
            tracing::debug!(
                activity = %record.activity(),
                side = %side,
                reason = %reason,
                "Side skipped"
            );
        }

        for sample in extraction.samples() {
            let key = sample.dedup_key();
            if self.dedup.seen(&key) {
                report.duplicates += 1;
                continue;
            }
            self.sink.append(sample)?;
            self.dedup.record(key);
            report.samples_written += 1;
        }
        Ok(())
    }
}

/// Resolve an identity, read its history and fetch every detail.
///
/// Details are fetched concurrently; the fetcher's slots bound them.
async fn explore<T: Transport>(upstream: &Upstream<T>, identity: Identity) -> Exploration {
    let account = match upstream.resolve(&identity).await {
        Ok(Resolution::Found(account)) => account,
        Ok(Resolution::NotFound) => return Exploration::NotFound(identity),
        Err(error) => return Exploration::Failed { identity, error },
    };

    let activities = upstream.recent_activities(&account).await;
    let records = join_all(activities.iter().map(|activity| upstream.detail(activity)))
        .await
        .into_iter()
        .flatten()
        .collect();

    Exploration::Visited {
        identity,
        activities: activities.len(),
        records,
    }
}

/// Completes once shutdown is set. Never completes if the sender is gone.
async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

// =============================================================================
// TESTS
// =============================================================================
