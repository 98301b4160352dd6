//! # Application Errors
//!
//! The top-level error of the binary. Only these reach `main`, where they
//! are logged and turned into exit status 1.

use crate::upstream::UpstreamError;
use compscout_core::ScoutError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store, seed-list or role-table fault.
    #[error(transparent)]
    Core(#[from] ScoutError),

    /// Upstream failure that the command cannot degrade.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),
}
