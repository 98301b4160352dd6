//! # compscout CLI Module
//!
//! ## Available Commands
//!
//! - `crawl` - Run the frontier crawl
//! - `harvest` - Append participants of a player's recent games to the seed list
//! - `status` - Summarize the sample store (default)

mod commands;

use clap::{Parser, Subcommand};
use compscout::{AppError, Config};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// compscout - team composition crawler
///
/// Collects labelled five-member team compositions from public match
/// histories.
#[derive(Parser, Debug)]
#[command(name = "compscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: ./compscout.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl outward from the seed player
    Crawl {
        /// Stop after this many cycles (default: run until Ctrl+C)
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Seed player as NAME#TAG, overriding the configured seed
        #[arg(short, long)]
        seed: Option<String>,
    },

    /// Grow the seed list from one player's recent activities
    Harvest {
        /// Source player as NAME#TAG (default: a random seed-list entry)
        #[arg(short, long)]
        from: Option<String>,
    },

    /// Summarize the sample store
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_process_env();
    config.validate()?;

    match cli.command {
        Some(Commands::Crawl { cycles, seed }) => cmd_crawl(&config, cycles, seed.as_deref()).await,
        Some(Commands::Harvest { from }) => cmd_harvest(&config, from.as_deref()).await,
        Some(Commands::Status { json }) => cmd_status(&config, json),
        None => {
            // No subcommand - show status by default
            cmd_status(&config, false)
        }
    }
}
