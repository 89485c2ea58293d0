//! Archive repository for JSON storage
//!
//! Holds snapshots of deleted notes and budget entries in archives.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Archive, ArchiveId, ArchiveKind};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ArchiveData {
    archives: Vec<Archive>,
}

/// Repository for archive persistence
pub struct ArchiveRepository {
    path: PathBuf,
    data: RwLock<HashMap<ArchiveId, Archive>>,
}

impl ArchiveRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: ArchiveData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_err)?;

        data.clear();
        for archive in file_data.archives {
            data.insert(archive.id, archive);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let archives = self.get_all()?;
        write_json_atomic(&self.path, &ArchiveData { archives })
    }

    pub fn get(&self, id: ArchiveId) -> Result<Option<Archive>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(&id).cloned())
    }

    pub fn contains(&self, id: ArchiveId) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(&id))
    }

    /// All archives, most recently deleted first
    pub fn get_all(&self) -> Result<Vec<Archive>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut archives: Vec<_> = data.values().cloned().collect();
        archives.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(archives)
    }

    pub fn get_by_kind(&self, kind: ArchiveKind) -> Result<Vec<Archive>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|a| a.kind == kind)
            .collect())
    }

    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<Archive>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|a| a.id.matches_short(short))
            .cloned()
            .collect())
    }

    pub fn insert(&self, archive: Archive) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        data.insert(archive.id, archive);
        Ok(())
    }

    pub fn delete(&self, id: ArchiveId) -> Result<Option<Archive>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetEntry, CategoryId, EntryType, Money, Note, NoteId};
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    #[test]
    fn test_newest_first_and_kind_filter() {
        let temp_dir = TempDir::new().unwrap();
        let repo = ArchiveRepository::new(temp_dir.path().join("archives.json"));

        let note = Note::new("Old note", "", CategoryId::new());
        let mut older = Archive::of_note(&note, &[]).unwrap();
        older.deleted_at -= Duration::hours(1);
        let entry = BudgetEntry::new(
            NoteId::new(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            "Coffee",
            EntryType::Expense,
            Money::from_cents(350),
        );
        let newer = Archive::of_entry(&entry).unwrap();

        repo.insert(older.clone()).unwrap();
        repo.insert(newer.clone()).unwrap();
        repo.save().unwrap();

        let reloaded = ArchiveRepository::new(temp_dir.path().join("archives.json"));
        reloaded.load().unwrap();

        let all = reloaded.get_all().unwrap();
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);
        assert_eq!(reloaded.get_by_kind(ArchiveKind::Note).unwrap().len(), 1);
    }
}
