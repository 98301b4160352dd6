//! # Core Type Definitions
//!
//! This module contains the core types shared by every compscout component:
//! - Player identifiers (`Identity`, `IdentityKey`, `AccountRef`)
//! - Activity identifiers (`ActivityRef`, `SideTag`)
//! - Role labels (`RoleCategory`)
//! - Persisted output (`TeamMember`, `TeamSample`, `DedupKey`)
//! - Error types (`ScoutError`)
//!
//! ## Ordering Guarantees
//!
//! Every key type implements `Ord` so that sets and maps built from them are
//! `BTreeSet`/`BTreeMap` and iterate deterministically.

use crate::primitives::{MAX_IDENTITY_PART_LENGTH, TEAM_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// PLAYER IDENTIFIERS
// =============================================================================

/// A human-facing player identity: display name plus discriminator.
///
/// Both parts are trimmed on construction. Casing is preserved for display
/// and upstream requests; comparisons go through [`IdentityKey`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    name: String,
    tag: String,
}

impl Identity {
    /// Create an identity from a display name and discriminator.
    #[must_use]
    pub fn new(name: impl AsRef<str>, tag: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            tag: tag.as_ref().trim().to_string(),
        }
    }

    /// Parse the `name#tag` form used on the command line.
    ///
    /// The last `#` separates the two parts, so display names containing `#`
    /// still parse.
    pub fn parse(raw: &str) -> Result<Self, ScoutError> {
        let (name, tag) = raw
            .rsplit_once('#')
            .ok_or_else(|| ScoutError::InvalidIdentity(raw.to_string()))?;
        let identity = Self::new(name, tag);
        identity.validate()?;
        Ok(identity)
    }

    /// The trimmed display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The trimmed discriminator.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Normalized key used for visited sets, pruning and seed-list lookups.
    #[must_use]
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            name: self.name.to_lowercase(),
            tag: self.tag.to_lowercase(),
        }
    }

    /// Check that the identity is safe to embed in a request path.
    ///
    /// Rejects empty parts, control characters and over-long parts.
    pub fn validate(&self) -> Result<(), ScoutError> {
        let part_ok = |part: &str| {
            !part.is_empty()
                && part.len() <= MAX_IDENTITY_PART_LENGTH
                && !part.chars().any(char::is_control)
        };
        if part_ok(&self.name) && part_ok(&self.tag) {
            Ok(())
        } else {
            Err(ScoutError::InvalidIdentity(self.to_string()))
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.tag)
    }
}

/// Case- and whitespace-normalized form of an [`Identity`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey {
    name: String,
    tag: String,
}

/// Opaque stable account identifier returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountRef(pub String);

impl AccountRef {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ACTIVITY IDENTIFIERS
// =============================================================================

/// Opaque, globally unique identifier of one completed match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActivityRef(pub String);

impl ActivityRef {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActivityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw team-side tag carried by each participant (e.g. `100`, `200`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SideTag(pub u16);

impl fmt::Display for SideTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ROLE CATEGORY
// =============================================================================

/// Coarse functional role of a persona.
///
/// The ten labelled categories form a closed set. `Unknown` is the sentinel
/// for personas missing from the role table; samples containing it are never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoleCategory {
    Burst,
    BruiserAd,
    BruiserAp,
    CcTank,
    Poke,
    SustainMage,
    SustainTank,
    AssassinAd,
    DpsMarksman,
    UtilitySupport,
    Unknown,
}

impl RoleCategory {
    /// All labelled categories, excluding `Unknown`.
    pub const LABELLED: [Self; 10] = [
        Self::Burst,
        Self::BruiserAd,
        Self::BruiserAp,
        Self::CcTank,
        Self::Poke,
        Self::SustainMage,
        Self::SustainTank,
        Self::AssassinAd,
        Self::DpsMarksman,
        Self::UtilitySupport,
    ];

    /// The label as written in the role table and the sample store.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Burst => "Burst",
            Self::BruiserAd => "Bruiser AD",
            Self::BruiserAp => "Bruiser AP",
            Self::CcTank => "CC Tank",
            Self::Poke => "Poke",
            Self::SustainMage => "Sustain Mage",
            Self::SustainTank => "Sustain Tank",
            Self::AssassinAd => "Assassin AD",
            Self::DpsMarksman => "DPS Marksman",
            Self::UtilitySupport => "Utility Support",
            Self::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoleCategory {
    type Err = ScoutError;

    /// Parse a labelled category. `"Unknown"` is not accepted: it is never a
    /// valid table entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::LABELLED
            .into_iter()
            .find(|role| role.label() == trimmed)
            .ok_or_else(|| ScoutError::UnknownRoleLabel(trimmed.to_string()))
    }
}

// =============================================================================
// TEAM SAMPLE
// =============================================================================

/// One member of a team sample: persona name and its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    pub persona: String,
    pub role: RoleCategory,
}

impl TeamMember {
    #[must_use]
    pub fn new(persona: impl Into<String>, role: RoleCategory) -> Self {
        Self {
            persona: persona.into(),
            role,
        }
    }
}

/// One labelled side of one activity. This is the only persisted entity.
///
/// Construction enforces the persistence invariant: exactly `TEAM_SIZE`
/// members and no `Unknown` role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSample {
    activity: ActivityRef,
    members: Vec<TeamMember>,
    won: bool,
}

impl TeamSample {
    /// Build a sample, or `None` if the members violate the invariant.
    #[must_use]
    pub fn new(activity: ActivityRef, members: Vec<TeamMember>, won: bool) -> Option<Self> {
        if members.len() != TEAM_SIZE || members.iter().any(|m| m.role.is_unknown()) {
            return None;
        }
        Some(Self {
            activity,
            members,
            won,
        })
    }

    #[must_use]
    pub fn activity(&self) -> &ActivityRef {
        &self.activity
    }

    /// Members in the order the activity record listed them.
    #[must_use]
    pub fn members(&self) -> &[TeamMember] {
        &self.members
    }

    #[must_use]
    pub fn won(&self) -> bool {
        self.won
    }

    /// Binary outcome label: 1 for a win, 0 for a loss.
    #[must_use]
    pub fn label(&self) -> u8 {
        u8::from(self.won)
    }

    /// The dedup key of this sample.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(
            self.activity.clone(),
            self.members.iter().map(|m| m.persona.as_str()),
        )
    }
}

// =============================================================================
// DEDUP KEY
// =============================================================================

/// Activity plus the sorted persona names of one side.
///
/// Sorting makes the key independent of participant order across fetches.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DedupKey {
    activity: ActivityRef,
    personas: Vec<String>,
}

impl DedupKey {
    #[must_use]
    pub fn new<I, S>(activity: ActivityRef, personas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut personas: Vec<String> = personas.into_iter().map(Into::into).collect();
        personas.sort();
        Self {
            activity,
            personas,
        }
    }

    #[must_use]
    pub fn activity(&self) -> &ActivityRef {
        &self.activity
    }

    #[must_use]
    pub fn personas(&self) -> &[String] {
        &self.personas
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.activity, self.personas.join(","))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the compscout core.
///
/// `MalformedRecord` is the only per-activity variant; callers degrade it to
/// "no record". The rest are programming or I/O faults: bad static inputs or
/// an unreadable/unwritable store.
#[derive(Debug, Error)]
pub enum ScoutError {
    /// An identity cannot be parsed or is unsafe to send upstream.
    #[error("Invalid identity: {0:?}")]
    InvalidIdentity(String),

    /// A role label outside the closed category set.
    #[error("Unknown role label: {0:?}")]
    UnknownRoleLabel(String),

    /// The role table has a malformed row.
    #[error("Invalid role table at line {line}: {detail}")]
    InvalidRoleTable { line: u64, detail: String },

    /// An activity payload lacks a required field.
    #[error("Malformed activity record: {0}")]
    MalformedRecord(String),

    /// A CSV read or write failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// TESTS
// =============================================================================
