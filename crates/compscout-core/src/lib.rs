//! # compscout-core
//!
//! The synchronous domain engine of compscout - THE LOGIC.
//!
//! This crate knows what a team sample is and how to persist it, but not how
//! to reach the upstream API. It holds:
//! - `types` - identities, activity refs, roles, samples, dedup keys, errors
//! - `record` - the typed view of one match-detail payload
//! - `roles` - the static persona → role table
//! - `extractor` - record → labelled team samples
//! - `dedup` - the in-memory set of persisted keys
//! - `frontier` - the crawl queue and its visited/pruned guards
//! - `sink` - the append-only CSV sample store
//! - `seeds` - the optional persisted seed list
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies
//! - Deterministic collections only (`BTreeMap`/`BTreeSet`)
//! - No logging: failures are returned, the app layer reports them

// =============================================================================
// MODULES
// =============================================================================

pub mod dedup;
pub mod extractor;
pub mod frontier;
pub mod primitives;
pub mod record;
pub mod roles;
pub mod seeds;
pub mod sink;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{
    AccountRef, ActivityRef, DedupKey, Identity, IdentityKey, RoleCategory, ScoutError, SideTag,
    TeamMember, TeamSample,
};

// =============================================================================
// RE-EXPORTS: Components
// =============================================================================

pub use dedup::DedupStore;
pub use extractor::{Extraction, SideOutcome, SkipReason, TeamExtractor};
pub use frontier::Frontier;
pub use record::{ActivityRecord, Participant};
pub use roles::RoleTable;
pub use seeds::SeedList;
pub use sink::{SampleSink, StoreSummary};
