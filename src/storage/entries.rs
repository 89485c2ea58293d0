//! Budget entry repository for JSON storage
//!
//! Manages loading and saving budget entries to entries.json, with an
//! index from note to its entries.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::NaiveDate;

use crate::error::LedgerError;
use crate::models::{BudgetEntry, EntryId, Month, NoteId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EntryData {
    entries: Vec<BudgetEntry>,
}

fn newest_first(a: &BudgetEntry, b: &BudgetEntry) -> std::cmp::Ordering {
    b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at))
}

/// Repository for budget entry persistence with indexing
pub struct EntryRepository {
    path: PathBuf,
    data: RwLock<HashMap<EntryId, BudgetEntry>>,
    /// Index: note_id -> entry_ids
    by_note: RwLock<HashMap<NoteId, Vec<EntryId>>>,
}

impl EntryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_note: RwLock::new(HashMap::new()),
        }
    }

    /// Load entries from disk and build the note index
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: EntryData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_note = self.by_note.write().map_err(lock_err)?;

        data.clear();
        by_note.clear();

        for entry in file_data.entries {
            by_note.entry(entry.note_id).or_default().push(entry.id);
            data.insert(entry.id, entry);
        }

        Ok(())
    }

    /// Save entries to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let entries = self.get_all()?;
        write_json_atomic(&self.path, &EntryData { entries })
    }

    pub fn get(&self, id: EntryId) -> Result<Option<BudgetEntry>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(&id).cloned())
    }

    pub fn contains(&self, id: EntryId) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(&id))
    }

    /// Get all entries, newest first
    pub fn get_all(&self) -> Result<Vec<BudgetEntry>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut entries: Vec<_> = data.values().cloned().collect();
        entries.sort_by(newest_first);
        Ok(entries)
    }

    /// Get entries attached to a note, newest first
    pub fn get_by_note(&self, note_id: NoteId) -> Result<Vec<BudgetEntry>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let by_note = self.by_note.read().map_err(lock_err)?;

        let ids = by_note.get(&note_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut entries: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        entries.sort_by(newest_first);
        Ok(entries)
    }

    /// Get entries dated within a calendar month, newest first
    pub fn get_by_month(&self, month: Month) -> Result<Vec<BudgetEntry>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut entries: Vec<_> = data
            .values()
            .filter(|e| month.contains(e.date))
            .cloned()
            .collect();
        entries.sort_by(newest_first);
        Ok(entries)
    }

    /// Get entries carrying a recurrence rule
    pub fn get_templates(&self) -> Result<Vec<BudgetEntry>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut templates: Vec<_> = data.values().filter(|e| e.is_template()).cloned().collect();
        templates.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));
        Ok(templates)
    }

    /// Whether an occurrence of `template` dated `date` already exists
    pub fn has_occurrence(&self, template: EntryId, date: NaiveDate) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .any(|e| e.generated_from == Some(template) && e.date == date))
    }

    /// Date of the newest occurrence generated from `template`
    pub fn latest_occurrence(&self, template: EntryId) -> Result<Option<NaiveDate>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|e| e.generated_from == Some(template))
            .map(|e| e.date)
            .max())
    }

    /// Find entries whose short id matches
    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<BudgetEntry>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|e| e.id.matches_short(short))
            .cloned()
            .collect())
    }

    /// Insert or update an entry, keeping the note index current
    pub fn upsert(&self, entry: BudgetEntry) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_note = self.by_note.write().map_err(lock_err)?;

        if let Some(old) = data.get(&entry.id) {
            if old.note_id != entry.note_id {
                if let Some(ids) = by_note.get_mut(&old.note_id) {
                    ids.retain(|id| *id != entry.id);
                }
            }
        }

        let ids = by_note.entry(entry.note_id).or_default();
        if !ids.contains(&entry.id) {
            ids.push(entry.id);
        }

        data.insert(entry.id, entry);
        Ok(())
    }

    /// Remove an entry, returning it if it existed
    pub fn delete(&self, id: EntryId) -> Result<Option<BudgetEntry>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_note = self.by_note.write().map_err(lock_err)?;

        let removed = data.remove(&id);
        if let Some(entry) = &removed {
            if let Some(ids) = by_note.get_mut(&entry.note_id) {
                ids.retain(|i| *i != id);
            }
        }
        Ok(removed)
    }

    /// Remove every entry of a note, returning the removed entries
    pub fn delete_by_note(&self, note_id: NoteId) -> Result<Vec<BudgetEntry>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        let mut by_note = self.by_note.write().map_err(lock_err)?;

        let ids = by_note.remove(&note_id).unwrap_or_default();
        Ok(ids.into_iter().filter_map(|id| data.remove(&id)).collect())
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryType, Frequency, Money, Recurrence};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, EntryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = EntryRepository::new(temp_dir.path().join("entries.json"));
        (temp_dir, repo)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn expense(note_id: NoteId, on: NaiveDate, cents: i64) -> BudgetEntry {
        BudgetEntry::new(
            note_id,
            on,
            "Groceries",
            EntryType::Expense,
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_note_index_survives_reload() {
        let (temp_dir, repo) = create_test_repo();
        let note = NoteId::new();
        let other = NoteId::new();

        repo.upsert(expense(note, date(2025, 1, 3), 1000)).unwrap();
        repo.upsert(expense(note, date(2025, 1, 9), 2000)).unwrap();
        repo.upsert(expense(other, date(2025, 1, 9), 500)).unwrap();
        repo.save().unwrap();

        let reloaded = EntryRepository::new(temp_dir.path().join("entries.json"));
        reloaded.load().unwrap();

        let entries = reloaded.get_by_note(note).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].date, date(2025, 1, 9));
    }

    #[test]
    fn test_moving_entry_updates_index() {
        let (_temp_dir, repo) = create_test_repo();
        let from = NoteId::new();
        let to = NoteId::new();

        let mut entry = expense(from, date(2025, 2, 1), 100);
        repo.upsert(entry.clone()).unwrap();
        entry.note_id = to;
        repo.upsert(entry).unwrap();

        assert!(repo.get_by_note(from).unwrap().is_empty());
        assert_eq!(repo.get_by_note(to).unwrap().len(), 1);
    }

    #[test]
    fn test_get_by_month() {
        let (_temp_dir, repo) = create_test_repo();
        let note = NoteId::new();
        repo.upsert(expense(note, date(2025, 1, 31), 100)).unwrap();
        repo.upsert(expense(note, date(2025, 2, 1), 100)).unwrap();

        let jan = Month::new(2025, 1).unwrap();
        assert_eq!(repo.get_by_month(jan).unwrap().len(), 1);
    }

    #[test]
    fn test_templates_and_occurrence_lookup() {
        let (_temp_dir, repo) = create_test_repo();
        let note = NoteId::new();

        let mut template = expense(note, date(2025, 1, 15), 5000);
        template.recurrence = Some(Recurrence::new(Frequency::Monthly, template.date, None));
        let occurrence = template.occurrence(date(2025, 2, 15));
        repo.upsert(template.clone()).unwrap();
        repo.upsert(occurrence).unwrap();

        assert_eq!(repo.get_templates().unwrap().len(), 1);
        assert!(repo.has_occurrence(template.id, date(2025, 2, 15)).unwrap());
        assert!(!repo.has_occurrence(template.id, date(2025, 3, 15)).unwrap());
    }

    #[test]
    fn test_delete_by_note() {
        let (_temp_dir, repo) = create_test_repo();
        let note = NoteId::new();
        repo.upsert(expense(note, date(2025, 1, 1), 100)).unwrap();
        repo.upsert(expense(note, date(2025, 1, 2), 100)).unwrap();
        repo.upsert(expense(NoteId::new(), date(2025, 1, 2), 100)).unwrap();

        let removed = repo.delete_by_note(note).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(repo.count().unwrap(), 1);
    }
}
