//! # Activity Records
//!
//! Typed view of one match-detail payload.
//!
//! Only the fields the extractor and the frontier need are decoded; every
//! other field of the upstream document is ignored. A payload missing any of
//! the required fields fails to decode as a whole and the caller drops it.

use crate::{ActivityRef, Identity, ScoutError, SideTag};
use serde::Deserialize;
use std::collections::BTreeMap;

// =============================================================================
// WIRE SHAPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct DetailPayload {
    metadata: DetailMetadata,
    info: DetailInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetailMetadata {
    match_id: String,
}

#[derive(Debug, Deserialize)]
struct DetailInfo {
    participants: Vec<WireParticipant>,
    #[serde(default)]
    teams: Vec<WireTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireParticipant {
    champion_name: String,
    team_id: u16,
    #[serde(default)]
    riot_id_game_name: Option<String>,
    #[serde(default)]
    riot_id_tagline: Option<String>,
    #[serde(default)]
    win: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTeam {
    team_id: u16,
    win: bool,
}

// =============================================================================
// DOMAIN SHAPE
// =============================================================================

/// One participant of an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// In-game persona (champion) name.
    pub persona: String,
    /// Raw side tag.
    pub side: SideTag,
    /// Player identity, when the record exposes both parts.
    pub identity: Option<Identity>,
}

impl Participant {
    #[must_use]
    pub fn new(persona: impl Into<String>, side: SideTag, identity: Option<Identity>) -> Self {
        Self {
            persona: persona.into(),
            side,
            identity,
        }
    }
}

/// Full detail of one completed activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    activity: ActivityRef,
    participants: Vec<Participant>,
    outcomes: BTreeMap<SideTag, bool>,
}

impl ActivityRecord {
    #[must_use]
    pub fn new(
        activity: ActivityRef,
        participants: Vec<Participant>,
        outcomes: BTreeMap<SideTag, bool>,
    ) -> Self {
        Self {
            activity,
            participants,
            outcomes,
        }
    }

    /// Decode a match-detail payload.
    ///
    /// Side outcomes come from `info.teams`, matched by team id. A side
    /// absent from `teams` falls back to its participants' `win` flags when
    /// they all agree.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ScoutError> {
        let payload: DetailPayload = serde_json::from_value(value)
            .map_err(|e| ScoutError::MalformedRecord(e.to_string()))?;

        let mut outcomes: BTreeMap<SideTag, bool> = payload
            .info
            .teams
            .iter()
            .map(|t| (SideTag(t.team_id), t.win))
            .collect();

        let mut flags: BTreeMap<SideTag, Vec<bool>> = BTreeMap::new();
        for p in &payload.info.participants {
            if let Some(win) = p.win {
                flags.entry(SideTag(p.team_id)).or_default().push(win);
            }
        }
        for (side, wins) in flags {
            if let Some(first) = wins.first().copied()
                && wins.iter().all(|w| *w == first)
            {
                outcomes.entry(side).or_insert(first);
            }
        }

        let participants = payload
            .info
            .participants
            .into_iter()
            .map(|p| {
                let identity = match (p.riot_id_game_name, p.riot_id_tagline) {
                    (Some(name), Some(tag)) if !name.trim().is_empty() && !tag.trim().is_empty() => {
                        Some(Identity::new(name, tag))
                    }
                    _ => None,
                };
                Participant::new(p.champion_name, SideTag(p.team_id), identity)
            })
            .collect();

        Ok(Self {
            activity: ActivityRef::new(payload.metadata.match_id),
            participants,
            outcomes,
        })
    }

    #[must_use]
    pub fn activity(&self) -> &ActivityRef {
        &self.activity
    }

    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Participants of one side, in record order.
    pub fn side(&self, side: SideTag) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(move |p| p.side == side)
    }

    /// Recorded outcome of one side, if any.
    #[must_use]
    pub fn outcome(&self, side: SideTag) -> Option<bool> {
        self.outcomes.get(&side).copied()
    }

    /// Identities of all participants that expose one.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.participants.iter().filter_map(|p| p.identity.as_ref())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "metadata": { "matchId": "KR_1" },
            "info": {
                "participants": [
                    { "championName": "Ahri", "teamId": 100, "riotIdGameName": "Alpha", "riotIdTagline": "KR1" },
                    { "championName": "Jinx", "teamId": 200, "riotIdGameName": "Beta", "riotIdTagline": "" },
                    { "championName": "Lux",  "teamId": 200 }
                ],
                "teams": [
                    { "teamId": 200, "win": false },
                    { "teamId": 100, "win": true }
                ]
            }
        })
    }

    #[test]
    fn decodes_required_fields() {
        let record = ActivityRecord::from_json(payload()).expect("decode");
        assert_eq!(record.activity().as_str(), "KR_1");
        assert_eq!(record.participants().len(), 3);
        assert_eq!(record.side(SideTag(200)).count(), 2);
    }

    #[test]
    fn outcomes_matched_by_team_id() {
        let record = ActivityRecord::from_json(payload()).expect("decode");
        assert_eq!(record.outcome(SideTag(100)), Some(true));
        assert_eq!(record.outcome(SideTag(200)), Some(false));
        assert_eq!(record.outcome(SideTag(300)), None);
    }

    #[test]
    fn only_complete_identities_are_exposed() {
        let record = ActivityRecord::from_json(payload()).expect("decode");
        let ids: Vec<_> = record.identities().collect();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].to_string(), "Alpha#KR1");
    }

    #[test]
    fn outcome_falls_back_to_participant_flags() {
        let value = json!({
            "metadata": { "matchId": "KR_2" },
            "info": {
                "participants": [
                    { "championName": "Ahri", "teamId": 100, "win": true },
                    { "championName": "Zed", "teamId": 100, "win": true },
                    { "championName": "Jinx", "teamId": 200, "win": false },
                    { "championName": "Lux", "teamId": 200, "win": true }
                ]
            }
        });
        let record = ActivityRecord::from_json(value).expect("decode");
        assert_eq!(record.outcome(SideTag(100)), Some(true));
        assert_eq!(record.outcome(SideTag(200)), None);
    }

    #[test]
    fn missing_fields_are_malformed() {
        let no_meta = json!({ "info": { "participants": [] } });
        assert!(matches!(
            ActivityRecord::from_json(no_meta),
            Err(ScoutError::MalformedRecord(_))
        ));

        let no_champion = json!({
            "metadata": { "matchId": "KR_3" },
            "info": { "participants": [ { "teamId": 100 } ] }
        });
        assert!(ActivityRecord::from_json(no_champion).is_err());
    }
}
