//! # Team Extractor
//!
//! Turns one activity record into labelled team samples.
//!
//! Extraction never fails. Each side yields either a `Sample` or a
//! `Skipped` outcome carrying the reason, and the crawler counts the skips.
//! A record produces samples only when both of its sides are valid.

use crate::primitives::{TEAM_SIDES, TEAM_SIZE};
use crate::record::ActivityRecord;
use crate::roles::RoleTable;
use crate::{SideTag, TeamMember, TeamSample};
use std::fmt;

/// Why a side produced no sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The side does not have exactly `TEAM_SIZE` participants.
    WrongSize { found: usize },
    /// A persona on the side has no role in the table.
    UnknownRole { persona: String },
    /// The record carries no outcome for the side.
    MissingOutcome,
    /// The side is valid but the opposing side is not.
    OpponentInvalid,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongSize { found } => write!(f, "{found} participants, expected {TEAM_SIZE}"),
            Self::UnknownRole { persona } => write!(f, "no role for persona {persona:?}"),
            Self::MissingOutcome => f.write_str("no recorded outcome"),
            Self::OpponentInvalid => f.write_str("opposing side invalid"),
        }
    }
}

/// Result of extracting one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideOutcome {
    Sample(TeamSample),
    Skipped { side: SideTag, reason: SkipReason },
}

/// Outcomes for both sides of one record, in `TEAM_SIDES` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub outcomes: Vec<SideOutcome>,
}

impl Extraction {
    /// The produced samples.
    pub fn samples(&self) -> impl Iterator<Item = &TeamSample> {
        self.outcomes.iter().filter_map(|o| match o {
            SideOutcome::Sample(s) => Some(s),
            SideOutcome::Skipped { .. } => None,
        })
    }

    /// The skipped sides with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (SideTag, &SkipReason)> {
        self.outcomes.iter().filter_map(|o| match o {
            SideOutcome::Skipped { side, reason } => Some((*side, reason)),
            SideOutcome::Sample(_) => None,
        })
    }
}

/// Stateless extractor.
pub struct TeamExtractor;

impl TeamExtractor {
    /// Extract 0 or 2 samples from a record.
    #[must_use]
    pub fn extract(record: &ActivityRecord, roles: &RoleTable) -> Extraction {
        let sides: Vec<(SideTag, Result<TeamSample, SkipReason>)> = TEAM_SIDES
            .iter()
            .map(|&side| (side, Self::build_side(record, roles, side)))
            .collect();

        let all_valid = sides.iter().all(|(_, built)| built.is_ok());

        let outcomes = sides
            .into_iter()
            .map(|(side, built)| match built {
                Ok(sample) if all_valid => SideOutcome::Sample(sample),
                Ok(_) => SideOutcome::Skipped {
                    side,
                    reason: SkipReason::OpponentInvalid,
                },
                Err(reason) => SideOutcome::Skipped { side, reason },
            })
            .collect();

        Extraction { outcomes }
    }

    fn build_side(
        record: &ActivityRecord,
        roles: &RoleTable,
        side: SideTag,
    ) -> Result<TeamSample, SkipReason> {
        let members: Vec<TeamMember> = record
            .side(side)
            .map(|p| TeamMember::new(p.persona.clone(), roles.classify(&p.persona)))
            .collect();

        if members.len() != TEAM_SIZE {
            return Err(SkipReason::WrongSize {
                found: members.len(),
            });
        }
        if let Some(unknown) = members.iter().find(|m| m.role.is_unknown()) {
            return Err(SkipReason::UnknownRole {
                persona: unknown.persona.clone(),
            });
        }
        let won = record.outcome(side).ok_or(SkipReason::MissingOutcome)?;

        // Size and roles were checked above, so construction cannot refuse.
        TeamSample::new(record.activity().clone(), members, won).ok_or(SkipReason::WrongSize {
            found: TEAM_SIZE,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Participant;
    use crate::{ActivityRef, RoleCategory};
    use std::collections::BTreeMap;

    const BLUE: [&str; 5] = ["Ahri", "Darius", "Jinx", "Leona", "Lux"];
    const RED: [&str; 5] = ["Zed", "Garen", "Caitlyn", "Nami", "Ezreal"];

    fn roles() -> RoleTable {
        RoleTable::from_entries(BLUE.iter().chain(RED.iter()).map(|&p| (p, RoleCategory::Poke)))
    }

    fn record(blue: &[&str], red: &[&str], blue_won: bool) -> ActivityRecord {
        let participants = blue
            .iter()
            .map(|p| Participant::new(*p, SideTag(100), None))
            .chain(red.iter().map(|p| Participant::new(*p, SideTag(200), None)))
            .collect();
        let outcomes = BTreeMap::from([(SideTag(100), blue_won), (SideTag(200), !blue_won)]);
        ActivityRecord::new(ActivityRef::new("M1"), participants, outcomes)
    }

    #[test]
    fn full_record_yields_two_labelled_samples() {
        let extraction = TeamExtractor::extract(&record(&BLUE, &RED, true), &roles());
        let samples: Vec<_> = extraction.samples().collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label(), 1);
        assert_eq!(samples[1].label(), 0);
        assert_eq!(samples[0].members()[0].persona, "Ahri");
        assert_eq!(extraction.skipped().count(), 0);
    }

    #[test]
    fn short_side_yields_nothing() {
        let extraction = TeamExtractor::extract(&record(&BLUE[..4], &RED, false), &roles());
        assert_eq!(extraction.samples().count(), 0);
        let skipped: Vec<_> = extraction.skipped().collect();
        assert_eq!(skipped[0], (SideTag(100), &SkipReason::WrongSize { found: 4 }));
        assert_eq!(skipped[1], (SideTag(200), &SkipReason::OpponentInvalid));
    }

    #[test]
    fn unknown_role_yields_nothing() {
        let mut red = RED;
        red[2] = "Teemo";
        let extraction = TeamExtractor::extract(&record(&BLUE, &red, true), &roles());
        assert_eq!(extraction.samples().count(), 0);
        assert!(extraction.skipped().any(|(side, reason)| side == SideTag(200)
            && *reason
                == SkipReason::UnknownRole {
                    persona: "Teemo".to_string()
                }));
    }

    #[test]
    fn missing_outcome_yields_nothing() {
        let participants = BLUE
            .iter()
            .map(|p| Participant::new(*p, SideTag(100), None))
            .chain(RED.iter().map(|p| Participant::new(*p, SideTag(200), None)))
            .collect();
        let outcomes = BTreeMap::from([(SideTag(100), true)]);
        let record = ActivityRecord::new(ActivityRef::new("M9"), participants, outcomes);
        let extraction = TeamExtractor::extract(&record, &roles());
        assert_eq!(extraction.samples().count(), 0);
        assert!(extraction
            .skipped()
            .any(|(_, r)| *r == SkipReason::MissingOutcome));
    }

    #[test]
    fn six_player_side_yields_nothing() {
        let mut blue = BLUE.to_vec();
        blue.push("Zed");
        let extraction = TeamExtractor::extract(&record(&blue, &RED, true), &roles());
        assert_eq!(extraction.samples().count(), 0);
    }
}
