//! # Seed Harvester
//!
//! Grows the seed list from one known player: every participant of that
//! player's recent activities is appended to the list if it is not already
//! there. Without an explicit source, a random entry of the list is used so
//! repeated harvests spread across the players already known.

use crate::error::AppError;
use crate::fetcher::Transport;
use crate::upstream::{Resolution, Upstream};
use compscout_core::{Identity, IdentityKey, SeedList};
use futures::future::join_all;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HarvestReport {
    /// Activities listed in the source player's history.
    pub activities: usize,
    /// Details fetched and decoded.
    pub records: usize,
    /// Distinct identities seen across those records.
    pub discovered: usize,
    /// Identities newly written to the seed list.
    pub added: usize,
    /// The source player was unknown upstream and removed from the list.
    pub pruned: bool,
}

/// A random seed-list entry to harvest from. `None` when the list is empty.
pub fn pick_source<R: Rng + ?Sized>(seeds: &SeedList, rng: &mut R) -> Option<Identity> {
    seeds.identities().choose(rng).cloned()
}

/// Harvest participant identities from `from`'s recent activities.
pub async fn harvest<T: Transport>(
    upstream: &Upstream<T>,
    seeds: &mut SeedList,
    from: &Identity,
) -> Result<HarvestReport, AppError> {
    let mut report = HarvestReport::default();

    let account = match upstream.resolve(from).await? {
        Resolution::Found(account) => account,
        Resolution::NotFound => {
            report.pruned = seeds.prune(from)?;
            tracing::warn!(identity = %from, pruned = report.pruned, "Harvest source not found");
            return Ok(report);
        }
    };

    let activities = upstream.recent_activities(&account).await;
    report.activities = activities.len();

    let records: Vec<_> = join_all(activities.iter().map(|a| upstream.detail(a)))
        .await
        .into_iter()
        .flatten()
        .collect();
    report.records = records.len();

    let mut keys: BTreeSet<IdentityKey> = BTreeSet::new();
    let discovered: Vec<Identity> = records
        .iter()
        .flat_map(|r| r.identities())
        .filter(|id| keys.insert(id.key()))
        .cloned()
        .collect();
    report.discovered = discovered.len();

    report.added = seeds.append_new(&discovered)?;
    tracing::info!(
        identity = %from,
        activities = report.activities,
        discovered = report.discovered,
        added = report.added,
        seed_list = %seeds.path().display(),
        "Harvest complete"
    );
    Ok(report)
}
