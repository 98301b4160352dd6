//! # compscout
//!
//! Crawls match histories outward from a seed player and appends labelled
//! five-member team compositions to a CSV store.
//!
//! ## Usage
//!
//! ```bash
//! # Crawl forever (Ctrl+C stops between fetch steps)
//! RIOT_API_KEY=... SEED_GAME_NAME=foo SEED_TAG_LINE=bar compscout crawl
//!
//! # Two cycles only
//! compscout crawl --cycles 2
//!
//! # Grow the seed list from one player
//! compscout harvest --from "foo#bar"
//!
//! # Summarize the store
//! compscout status --json
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environment variables still apply.
    dotenv::dotenv().ok();

    // COMPSCOUT_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("COMPSCOUT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "compscout=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
