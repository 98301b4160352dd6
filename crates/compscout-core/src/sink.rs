//! # Persistence Sink
//!
//! Append-only CSV store of team samples.
//!
//! Layout: `match_id, champ_1..champ_5, role_1..role_5, label`, UTF-8.
//! The header is written exactly once, when the file is missing or empty.
//! There is no update or delete path; corrections are made offline.

use crate::primitives::{TEAM_SIZE, sample_store_header};
use crate::{ActivityRef, DedupKey, ScoutError, TeamSample};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Column index of the first role column.
const ROLE_OFFSET: usize = 1 + TEAM_SIZE;

/// Column index of the label column.
const LABEL_COLUMN: usize = 1 + 2 * TEAM_SIZE;

// =============================================================================
// SINK
// =============================================================================

/// Handle on the sample store file.
#[derive(Debug, Clone)]
pub struct SampleSink {
    path: PathBuf,
}

impl SampleSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one sample, writing the header first if the store is new.
    ///
    /// The row is flushed before returning.
    pub fn append(&self, sample: &TeamSample) -> Result<(), ScoutError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(sample_store_header())?;
        }
        writer.write_record(sample_row(sample))?;
        writer.flush()?;
        Ok(())
    }

    /// Rebuild dedup keys from every persisted row.
    ///
    /// A missing store yields no keys. Rows too short to carry a full team
    /// are ignored.
    pub fn load_keys(&self) -> Result<Vec<DedupKey>, ScoutError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let mut keys = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.len() < ROLE_OFFSET {
                continue;
            }
            keys.push(DedupKey::new(
                ActivityRef::new(&record[0]),
                (1..ROLE_OFFSET).map(|i| &record[i]),
            ));
        }
        Ok(keys)
    }

    /// Aggregate counts over the store.
    ///
    /// A row is counted once: in `rows` when it is full-width with a 0/1
    /// label, otherwise in `malformed_rows`.
    pub fn summarize(&self) -> Result<StoreSummary, ScoutError> {
        let mut summary = StoreSummary::default();
        if !self.path.exists() {
            return Ok(summary);
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)?;

        let mut activities = BTreeSet::new();
        for result in reader.records() {
            let record = result?;
            if record.len() <= LABEL_COLUMN {
                summary.malformed_rows += 1;
                continue;
            }
            match &record[LABEL_COLUMN] {
                "1" => summary.wins += 1,
                "0" => summary.losses += 1,
                _ => {
                    summary.malformed_rows += 1;
                    continue;
                }
            }
            summary.rows += 1;
            activities.insert(record[0].to_string());
            for role in (ROLE_OFFSET..LABEL_COLUMN).map(|i| &record[i]) {
                *summary.role_counts.entry(role.to_string()).or_insert(0) += 1;
            }
        }
        summary.distinct_activities = activities.len();
        Ok(summary)
    }
}

/// One store row for a sample.
fn sample_row(sample: &TeamSample) -> Vec<String> {
    let mut row = Vec::with_capacity(LABEL_COLUMN + 1);
    row.push(sample.activity().to_string());
    row.extend(sample.members().iter().map(|m| m.persona.clone()));
    row.extend(sample.members().iter().map(|m| m.role.label().to_string()));
    row.push(sample.label().to_string());
    row
}

// =============================================================================
// SUMMARY
// =============================================================================

/// Counts over the sample store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub rows: usize,
    pub distinct_activities: usize,
    pub wins: usize,
    pub losses: usize,
    pub malformed_rows: usize,
    pub role_counts: BTreeMap<String, usize>,
}

// =============================================================================
// TESTS
// =============================================================================
