//! # Role Classifier
//!
//! Static persona → role lookup.
//!
//! The table is a two-column CSV (`champion_name,role_group`) loaded once at
//! process start and kept for the process lifetime. Edits to the file take
//! effect on the next restart.

use crate::{RoleCategory, ScoutError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RoleRow {
    champion_name: String,
    role_group: String,
}

/// Persona name → role category.
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    entries: BTreeMap<String, RoleCategory>,
}

impl RoleTable {
    /// Build a table from in-memory pairs. Later duplicates win.
    #[must_use]
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, RoleCategory)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(persona, role)| (persona.into(), role))
                .collect(),
        }
    }

    /// Load the table from a CSV file.
    pub fn load(path: &Path) -> Result<Self, ScoutError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load the table from any CSV source.
    ///
    /// A row whose `role_group` is not a labelled category is rejected with
    /// its line number: a broken static table must not silently turn every
    /// persona it covers into `Unknown`.
    pub fn from_reader<R: Read>(source: R) -> Result<Self, ScoutError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(source);
        let headers = reader.headers()?.clone();
        let mut entries = BTreeMap::new();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let row: RoleRow =
                record
                    .deserialize(Some(&headers))
                    .map_err(|e| ScoutError::InvalidRoleTable {
                        line,
                        detail: e.to_string(),
                    })?;
            if row.champion_name.is_empty() {
                return Err(ScoutError::InvalidRoleTable {
                    line,
                    detail: "empty champion_name".to_string(),
                });
            }
            let role = row
                .role_group
                .parse::<RoleCategory>()
                .map_err(|e| ScoutError::InvalidRoleTable {
                    line,
                    detail: e.to_string(),
                })?;
            entries.insert(row.champion_name, role);
        }

        Ok(Self { entries })
    }

    /// Classify a persona. Total: absent personas are `Unknown`.
    #[must_use]
    pub fn classify(&self, persona: &str) -> RoleCategory {
        self.entries
            .get(persona)
            .copied()
            .unwrap_or(RoleCategory::Unknown)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "champion_name,role_group\n\
                         Ahri,Burst\n\
                         Darius, Bruiser AD \n\
                         Jinx,DPS Marksman\n";

    #[test]
    fn loads_and_classifies() {
        let table = RoleTable::from_reader(TABLE.as_bytes()).expect("load");
        assert_eq!(table.len(), 3);
        assert_eq!(table.classify("Ahri"), RoleCategory::Burst);
        assert_eq!(table.classify("Darius"), RoleCategory::BruiserAd);
        assert_eq!(table.classify("Jinx"), RoleCategory::DpsMarksman);
    }

    #[test]
    fn missing_persona_is_unknown() {
        let table = RoleTable::from_reader(TABLE.as_bytes()).expect("load");
        assert_eq!(table.classify("Teemo"), RoleCategory::Unknown);
        assert_eq!(table.classify("ahri"), RoleCategory::Unknown);
    }

    #[test]
    fn rejects_unlabelled_role_with_line() {
        let bad = "champion_name,role_group\nAhri,Burst\nGaren,Juggernaut\n";
        let err = RoleTable::from_reader(bad.as_bytes()).expect_err("juggernaut is not a role");
        assert!(matches!(err, ScoutError::InvalidRoleTable { line: 3, .. }));
        assert!(err.to_string().contains("Juggernaut"));
    }

    #[test]
    fn rejects_missing_column() {
        let bad = "champion_name\nAhri\n";
        assert!(RoleTable::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("roles.csv");
        std::fs::write(&path, TABLE).expect("write");
        let table = RoleTable::load(&path).expect("load");
        assert!(!table.is_empty());
    }
}
