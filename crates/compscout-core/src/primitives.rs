//! # Primitives
//!
//! Fixed constants of the crawl domain and the on-disk formats.
//!
//! Tunable runtime knobs (concurrency, delays, caps) live in the app's
//! configuration; the values here are properties of the data itself.

use crate::types::SideTag;

/// Number of participants on each side of an activity.
pub const TEAM_SIZE: usize = 5;

/// The two side tags of an activity, in the order samples are emitted.
pub const TEAM_SIDES: [SideTag; 2] = [SideTag(100), SideTag(200)];

/// Default bound on identities visited per crawl cycle.
pub const DEFAULT_CYCLE_VISIT_CAP: usize = 200;

/// Default number of recent activities read per account.
pub const DEFAULT_HISTORY_COUNT: u32 = 10;

/// Default game-mode filter for history reads.
pub const DEFAULT_MODE_FILTER: u32 = 450;

/// Maximum byte length of either part of an identity.
///
/// Longer parts are rejected before any request is built.
pub const MAX_IDENTITY_PART_LENGTH: usize = 64;

// =============================================================================
// STORE FORMATS
// =============================================================================

/// Column names of the role table.
pub const ROLE_TABLE_COLUMNS: [&str; 2] = ["champion_name", "role_group"];

/// Column names of the seed list.
pub const SEED_LIST_COLUMNS: [&str; 2] = ["game_name", "tag_line"];

/// Header row of the sample store:
/// `match_id, champ_1..champ_5, role_1..role_5, label`.
#[must_use]
pub fn sample_store_header() -> Vec<String> {
    let mut header = Vec::with_capacity(2 * TEAM_SIZE + 2);
    header.push("match_id".to_string());
    header.extend((1..=TEAM_SIZE).map(|i| format!("champ_{i}")));
    header.extend((1..=TEAM_SIZE).map(|i| format!("role_{i}")));
    header.push("label".to_string());
    header
}
