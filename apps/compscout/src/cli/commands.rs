//! # CLI Command Implementations

use compscout::{AppError, Config, Crawler, Fetcher, HttpTransport, Upstream, harvest, pick_source};
use compscout_core::{Identity, RoleTable, SampleSink, SeedList};
use std::sync::Arc;
use tokio::sync::{Semaphore, watch};

/// Build the production upstream client from configuration.
fn build_upstream(config: &Config) -> Result<Upstream<HttpTransport>, AppError> {
    let transport =
        HttpTransport::new(config.api_key()?, &config.api.auth_header, config.timeout())?;
    let slots = Arc::new(Semaphore::new(config.api.max_in_flight));
    let fetcher = Fetcher::new(transport, slots, config.retry_policy())
        .with_quota(config.api.requests_per_second);
    Upstream::new(fetcher, &config.api.base_url, config.history_query()).map_err(AppError::from)
}

/// `NAME#TAG` from the command line, else the configured seed.
fn identity_or_seed(raw: Option<&str>, config: &Config) -> Result<Identity, AppError> {
    match raw {
        Some(raw) => {
            let identity = Identity::parse(raw)?;
            identity.validate()?;
            Ok(identity)
        }
        None => config.seed(),
    }
}

// =============================================================================
// CRAWL COMMAND
// =============================================================================

/// Run the crawl until Ctrl+C or the cycle bound.
pub async fn cmd_crawl(
    config: &Config,
    cycles: Option<u64>,
    seed: Option<&str>,
) -> Result<(), AppError> {
    let seed = identity_or_seed(seed, config)?;

    let roles = RoleTable::load(&config.paths.roles)?;
    tracing::info!(
        path = %config.paths.roles.display(),
        entries = roles.len(),
        "Role table loaded"
    );

    let seeds = SeedList::load(&config.paths.seed_list)?;
    let upstream = build_upstream(config)?;
    let sink = SampleSink::new(&config.paths.store);

    let mut settings = config.crawl_settings(seed);
    settings.max_cycles = cycles;
    tracing::info!(
        seed = %settings.seed,
        visit_cap = settings.visit_cap,
        max_in_flight = config.api.max_in_flight,
        max_cycles = ?settings.max_cycles,
        "Starting crawl"
    );

    let mut crawler = Crawler::new(upstream, roles, sink, settings)?.with_seed_list(seeds);

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, stopping");
            let _ = stop_tx.send(true);
        }
    });

    let completed = crawler.run(stop_rx).await?;
    println!("Completed cycles: {}", completed);
    println!("Known samples:    {}", crawler.dedup_len());
    println!("Pruned players:   {}", crawler.frontier().pruned());
    Ok(())
}

// =============================================================================
// HARVEST COMMAND
// =============================================================================

/// Append participants of one player's recent activities to the seed list.
///
/// Without `from`, a random seed-list entry is the source; the configured
/// seed is used only while the list is empty.
pub async fn cmd_harvest(config: &Config, from: Option<&str>) -> Result<(), AppError> {
    let mut seeds = SeedList::load(&config.paths.seed_list)?;
    let from = match from {
        Some(raw) => identity_or_seed(Some(raw), config)?,
        None => match pick_source(&seeds, &mut rand::rng()) {
            Some(picked) => picked,
            None => {
                tracing::info!(
                    seed_list = %config.paths.seed_list.display(),
                    "Seed list empty, harvesting from the configured seed"
                );
                config.seed()?
            }
        },
    };
    let upstream = build_upstream(config)?;

    let report = harvest(&upstream, &mut seeds, &from).await?;

    if report.pruned {
        println!("{} was not found and has been removed from the seed list", from);
        return Ok(());
    }
    println!("Harvested from {}", from);
    println!("  Activities:  {}", report.activities);
    println!("  Records:     {}", report.records);
    println!("  Discovered:  {}", report.discovered);
    println!("  Added:       {}", report.added);
    println!("  Seed list:   {} entries", seeds.len());
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Summarize the sample store and seed list.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), AppError> {
    let summary = SampleSink::new(&config.paths.store).summarize()?;
    let seeds = SeedList::load(&config.paths.seed_list)?;

    if json_mode {
        let output = serde_json::json!({
            "store": config.paths.store.to_string_lossy(),
            "summary": summary,
            "seed_list": config.paths.seed_list.to_string_lossy(),
            "seed_count": seeds.len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("compscout Store Status");
    println!("======================");
    println!("Store:      {:?}", config.paths.store);
    println!("Seed list:  {:?} ({} entries)", config.paths.seed_list, seeds.len());
    println!();
    println!("Rows:                {}", summary.rows);
    println!("Distinct activities: {}", summary.distinct_activities);
    println!("Wins / Losses:       {} / {}", summary.wins, summary.losses);
    if summary.malformed_rows > 0 {
        println!("Malformed rows:      {}", summary.malformed_rows);
    }
    if !summary.role_counts.is_empty() {
        println!();
        println!("Role distribution:");
        for (role, count) in &summary.role_counts {
            println!("  {:<16} {}", role, count);
        }
    }

    Ok(())
}
