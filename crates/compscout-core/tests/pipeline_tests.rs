//! # Extraction → Dedup → Sink Pipeline Tests
//!
//! Exercises the single-writer path the crawl driver runs for every fetched
//! record, including a restart against an existing store.

use compscout_core::{
    ActivityRecord, DedupStore, RoleCategory, RoleTable, SampleSink, TeamExtractor,
};
use serde_json::{Value, json};
use std::path::Path;

const BLUE: [&str; 5] = ["Ahri", "Darius", "Jinx", "Leona", "Malphite"];
const RED: [&str; 5] = ["Zed", "Garen", "Caitlyn", "Nami", "Xerath"];

fn roles() -> RoleTable {
    RoleTable::from_entries([
        ("Ahri", RoleCategory::Burst),
        ("Darius", RoleCategory::BruiserAd),
        ("Jinx", RoleCategory::DpsMarksman),
        ("Leona", RoleCategory::CcTank),
        ("Malphite", RoleCategory::SustainTank),
        ("Zed", RoleCategory::AssassinAd),
        ("Garen", RoleCategory::BruiserAd),
        ("Caitlyn", RoleCategory::DpsMarksman),
        ("Nami", RoleCategory::UtilitySupport),
        ("Xerath", RoleCategory::Poke),
    ])
}

fn detail(match_id: &str, blue: &[&str], red: &[&str], blue_won: bool) -> Value {
    let participants: Vec<Value> = blue
        .iter()
        .map(|c| json!({ "championName": c, "teamId": 100 }))
        .chain(red.iter().map(|c| json!({ "championName": c, "teamId": 200 })))
        .collect();
    json!({
        "metadata": { "matchId": match_id },
        "info": {
            "participants": participants,
            "teams": [
                { "teamId": 100, "win": blue_won },
                { "teamId": 200, "win": !blue_won }
            ]
        }
    })
}

/// Run one record through extraction, dedup and the sink. Returns rows written.
fn persist(value: Value, roles: &RoleTable, dedup: &mut DedupStore, sink: &SampleSink) -> usize {
    let record = ActivityRecord::from_json(value).expect("decode");
    let mut written = 0;
    for sample in TeamExtractor::extract(&record, roles).samples() {
        let key = sample.dedup_key();
        if dedup.seen(&key) {
            continue;
        }
        sink.append(sample).expect("append");
        dedup.record(key);
        written += 1;
    }
    written
}

fn data_rows(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("read")
        .lines()
        .skip(1)
        .map(str::to_string)
        .collect()
}

#[test]
fn winning_and_losing_sides_are_labelled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = SampleSink::new(dir.path().join("team_data.csv"));
    let mut dedup = DedupStore::new();

    assert_eq!(persist(detail("M1", &BLUE, &RED, true), &roles(), &mut dedup, &sink), 2);

    let rows = data_rows(sink.path());
    assert_eq!(
        rows[0],
        "M1,Ahri,Darius,Jinx,Leona,Malphite,Burst,Bruiser AD,DPS Marksman,CC Tank,Sustain Tank,1"
    );
    assert!(rows[1].starts_with("M1,Zed,Garen"));
    assert!(rows[1].ends_with(",0"));
}

#[test]
fn four_player_side_persists_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = SampleSink::new(dir.path().join("team_data.csv"));
    let mut dedup = DedupStore::new();

    assert_eq!(persist(detail("M2", &BLUE[..4], &RED, true), &roles(), &mut dedup, &sink), 0);
    assert!(!sink.path().exists());
}

#[test]
fn reordered_refetch_persists_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = SampleSink::new(dir.path().join("team_data.csv"));
    let mut dedup = DedupStore::new();

    let mut blue = BLUE;
    blue.reverse();
    let mut red = RED;
    red.rotate_left(2);

    assert_eq!(persist(detail("M1", &BLUE, &RED, true), &roles(), &mut dedup, &sink), 2);
    assert_eq!(persist(detail("M1", &blue, &red, true), &roles(), &mut dedup, &sink), 0);
    assert_eq!(data_rows(sink.path()).len(), 2);
}

#[test]
fn restart_reconstructs_dedup_from_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("team_data.csv");

    {
        let sink = SampleSink::new(&path);
        let mut dedup = DedupStore::seeded(sink.load_keys().expect("keys"));
        assert!(dedup.is_empty());
        assert_eq!(persist(detail("M1", &BLUE, &RED, false), &roles(), &mut dedup, &sink), 2);
    }

    // New process: state comes only from the file.
    let sink = SampleSink::new(&path);
    let mut dedup = DedupStore::seeded(sink.load_keys().expect("keys"));
    assert_eq!(dedup.len(), 2);
    assert_eq!(persist(detail("M1", &BLUE, &RED, false), &roles(), &mut dedup, &sink), 0);
    assert_eq!(persist(detail("M3", &BLUE, &RED, true), &roles(), &mut dedup, &sink), 2);
    assert_eq!(data_rows(&path).len(), 4);
}
