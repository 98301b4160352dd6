//! # Seed List
//!
//! Optional persisted list of known player identities (`game_name,tag_line`).
//!
//! The harvester appends newly discovered identities; identities that the
//! upstream service reports as not found are pruned so they are never tried
//! again from this list.

use crate::primitives::SEED_LIST_COLUMNS;
use crate::{Identity, IdentityKey, ScoutError};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct SeedRow {
    #[serde(default)]
    game_name: String,
    #[serde(default)]
    tag_line: String,
}

/// In-memory copy of the seed list, kept in sync with its file.
#[derive(Debug, Clone)]
pub struct SeedList {
    path: PathBuf,
    entries: Vec<Identity>,
    keys: BTreeSet<IdentityKey>,
}

impl SeedList {
    /// Load the list. A missing file is an empty list.
    ///
    /// Blank or invalid rows and case-insensitive duplicates are dropped.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ScoutError> {
        let mut list = Self {
            path: path.into(),
            entries: Vec::new(),
            keys: BTreeSet::new(),
        };
        if !list.path.exists() {
            return Ok(list);
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&list.path)?;
        for result in reader.deserialize::<SeedRow>() {
            // Undecodable rows are skipped like blank ones.
            let Ok(row) = result else { continue };
            let identity = Identity::new(row.game_name, row.tag_line);
            if identity.validate().is_ok() && list.keys.insert(identity.key()) {
                list.entries.push(identity);
            }
        }
        Ok(list)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn identities(&self) -> &[Identity] {
        &self.entries
    }

    #[must_use]
    pub fn contains(&self, identity: &Identity) -> bool {
        self.keys.contains(&identity.key())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove an identity (case-insensitively) and rewrite the file.
    ///
    /// Returns `false` without touching the file when the identity is not
    /// on the list.
    pub fn prune(&mut self, identity: &Identity) -> Result<bool, ScoutError> {
        let key = identity.key();
        if !self.keys.remove(&key) {
            return Ok(false);
        }
        self.entries.retain(|e| e.key() != key);
        self.rewrite()?;
        Ok(true)
    }

    /// Append identities not yet on the list. Returns how many were added.
    pub fn append_new<'a, I>(&mut self, identities: I) -> Result<usize, ScoutError>
    where
        I: IntoIterator<Item = &'a Identity>,
    {
        let fresh: Vec<Identity> = identities
            .into_iter()
            .filter(|id| id.validate().is_ok())
            .filter(|id| self.keys.insert(id.key()))
            .cloned()
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let is_new = file.metadata()?.len() == 0;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_new {
            writer.write_record(SEED_LIST_COLUMNS)?;
        }
        for id in &fresh {
            writer.write_record([id.name(), id.tag()])?;
        }
        writer.flush()?;

        let added = fresh.len();
        self.entries.extend(fresh);
        Ok(added)
    }

    /// Replace the file with the current entries via a temp file + rename.
    fn rewrite(&self) -> Result<(), ScoutError> {
        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            writer.write_record(SEED_LIST_COLUMNS)?;
            for id in &self.entries {
                writer.write_record([id.name(), id.tag()])?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_list(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("user_list.csv");
        std::fs::write(&path, body).expect("write");
        path
    }

    #[test]
    fn load_skips_blank_and_duplicate_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_list(
            dir.path(),
            "game_name,tag_line\nAlpha,KR1\n,KR2\nalpha , kr1\nBeta,EUW\n",
        );
        let list = SeedList::load(&path).expect("load");
        assert_eq!(list.len(), 2);
        assert!(list.contains(&Identity::new("ALPHA", "kr1")));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let list = SeedList::load(dir.path().join("none.csv")).expect("load");
        assert!(list.is_empty());
    }

    #[test]
    fn prune_rewrites_without_identity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_list(dir.path(), "game_name,tag_line\nAlpha,KR1\nBeta,EUW\n");
        let mut list = SeedList::load(&path).expect("load");

        assert!(list.prune(&Identity::new("alpha", "KR1")).expect("prune"));
        assert!(!list.prune(&Identity::new("Gamma", "NA1")).expect("prune"));

        let reloaded = SeedList::load(&path).expect("reload");
        assert_eq!(reloaded.identities(), &[Identity::new("Beta", "EUW")]);
        let text = std::fs::read_to_string(&path).expect("read");
        assert!(text.starts_with("game_name,tag_line\n"));
    }

    #[test]
    fn append_new_adds_only_unseen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("user_list.csv");
        let mut list = SeedList::load(&path).expect("load");

        let batch = [
            Identity::new("Alpha", "KR1"),
            Identity::new("ALPHA", "kr1"),
            Identity::new("", "KR1"),
            Identity::new("Beta", "EUW"),
        ];
        assert_eq!(list.append_new(&batch).expect("append"), 2);
        assert_eq!(list.append_new(&batch).expect("append"), 0);

        let text = std::fs::read_to_string(&path).expect("read");
        assert_eq!(text, "game_name,tag_line\nAlpha,KR1\nBeta,EUW\n");
    }
}
