//! Archive service
//!
//! Deleted notes and entries are kept as JSON snapshots until restored or
//! purged. Restoring puts the records back under their original ids when
//! those ids are still free.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Archive, ArchiveId, ArchiveKind, BudgetEntry, EntryId, Month, Note, NoteId};
use crate::storage::Storage;

use super::{CategoryService, LimitService};

/// What a restore brought back
#[derive(Debug, Clone)]
pub enum Restored {
    Note {
        note: Note,
        entries: Vec<BudgetEntry>,
        /// The original category no longer existed
        moved_to_default: bool,
    },
    Entry(BudgetEntry),
}

impl Restored {
    /// Human-readable summary for command output
    pub fn describe(&self) -> String {
        match self {
            Restored::Note {
                note,
                entries,
                moved_to_default,
            } => {
                let mut text = format!("note '{}' ({})", note.title, note.id);
                if !entries.is_empty() {
                    text.push_str(&format!(" with {} entries", entries.len()));
                }
                if *moved_to_default {
                    text.push_str(", moved to the default category");
                }
                text
            }
            Restored::Entry(entry) => {
                format!("entry '{}' {} ({})", entry.description, entry.amount, entry.id)
            }
        }
    }
}

/// Service for archive listing, restore and purge
pub struct ArchiveService<'a> {
    storage: &'a Storage,
}

impl<'a> ArchiveService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Archives, most recently deleted first
    pub fn list(&self, kind: Option<ArchiveKind>) -> LedgerResult<Vec<Archive>> {
        match kind {
            Some(kind) => self.storage.archives.get_by_kind(kind),
            None => self.storage.archives.get_all(),
        }
    }

    /// Find an archive by full or short id (`arc-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> LedgerResult<Archive> {
        if let Ok(id) = identifier.parse::<ArchiveId>() {
            if let Some(archive) = self.storage.archives.get(id)? {
                return Ok(archive);
            }
        }

        let mut matches = self.storage.archives.find_by_short_id(identifier)?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(LedgerError::archive_not_found(identifier)),
            n => Err(LedgerError::Validation(format!(
                "'{}' matches {} archives; use a longer id",
                identifier, n
            ))),
        }
    }

    pub fn restore(&self, id: ArchiveId) -> LedgerResult<Restored> {
        let archive = self
            .storage
            .archives
            .get(id)?
            .ok_or_else(|| LedgerError::archive_not_found(id.to_string()))?;

        let (restored, months) = match archive.kind {
            ArchiveKind::Note => self.restore_note(&archive)?,
            ArchiveKind::BudgetEntry => self.restore_entry(&archive)?,
        };

        self.storage.archives.delete(id)?;
        self.storage.notes.save()?;
        self.storage.entries.save()?;
        self.storage.archives.save()?;

        LimitService::new(self.storage).recompute_months(months)?;
        info!(archive = %id, "restored {}", restored.describe());

        Ok(restored)
    }

    /// Restore the most recently archived record
    pub fn restore_latest(&self) -> LedgerResult<Restored> {
        let latest = self
            .storage
            .archives
            .get_all()?
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::Archive("Archive is empty; nothing to restore".into()))?;
        self.restore(latest.id)
    }

    /// Permanently delete one archive
    pub fn purge(&self, id: ArchiveId) -> LedgerResult<Archive> {
        let archive = self
            .storage
            .archives
            .delete(id)?
            .ok_or_else(|| LedgerError::archive_not_found(id.to_string()))?;

        self.storage.archives.save()?;
        self.storage.log_delete(
            EntityType::Archive,
            id.to_string(),
            Some(archive.label()),
            &archive,
        )?;

        Ok(archive)
    }

    /// Permanently delete every archive, or every archive of one kind
    pub fn purge_all(&self, kind: Option<ArchiveKind>) -> LedgerResult<usize> {
        let targets = self.list(kind)?;
        self.purge_each(targets)
    }

    /// Permanently delete archives deleted more than `days` days before `now`
    pub fn purge_older_than(&self, days: u32, now: DateTime<Utc>) -> LedgerResult<usize> {
        let cutoff = now - Duration::days(i64::from(days));
        let targets: Vec<Archive> = self
            .storage
            .archives
            .get_all()?
            .into_iter()
            .filter(|a| a.deleted_at < cutoff)
            .collect();
        self.purge_each(targets)
    }

    fn purge_each(&self, targets: Vec<Archive>) -> LedgerResult<usize> {
        for archive in &targets {
            self.storage.archives.delete(archive.id)?;
            self.storage.log_delete(
                EntityType::Archive,
                archive.id.to_string(),
                Some(archive.label()),
                archive,
            )?;
        }
        if !targets.is_empty() {
            self.storage.archives.save()?;
        }
        Ok(targets.len())
    }

    fn restore_note(&self, archive: &Archive) -> LedgerResult<(Restored, BTreeSet<Month>)> {
        let snapshot = archive
            .note_snapshot()
            .map_err(|e| LedgerError::Archive(format!("Unreadable note snapshot {}: {}", archive.id, e)))?;

        let mut note = snapshot.note;
        if self.storage.notes.contains(note.id)? {
            note.id = NoteId::new();
        }

        let moved_to_default = self.storage.categories.get(note.category_id)?.is_none();
        if moved_to_default {
            note.category_id = CategoryService::new(self.storage).ensure_default()?.id;
        }
        note.touch();

        // Entries keep their ids unless taken; occurrences follow a renamed template
        let mut renamed: HashMap<EntryId, EntryId> = HashMap::new();
        let mut entries = snapshot.entries;
        for entry in &mut entries {
            entry.note_id = note.id;
            if self.storage.entries.contains(entry.id)? {
                let fresh = EntryId::new();
                renamed.insert(entry.id, fresh);
                entry.id = fresh;
            }
        }
        for entry in &mut entries {
            if let Some(new_id) = entry.generated_from.and_then(|t| renamed.get(&t)) {
                entry.generated_from = Some(*new_id);
            }
        }

        self.storage.notes.upsert(note.clone())?;
        for entry in &entries {
            self.storage.entries.upsert(entry.clone())?;
        }

        self.storage.log_restore(
            EntityType::Note,
            note.id.to_string(),
            Some(note.title.clone()),
            &note,
        )?;

        let months = entries.iter().map(|e| Month::of(e.date)).collect();
        Ok((
            Restored::Note {
                note,
                entries,
                moved_to_default,
            },
            months,
        ))
    }

    fn restore_entry(&self, archive: &Archive) -> LedgerResult<(Restored, BTreeSet<Month>)> {
        let mut entry = archive
            .entry_snapshot()
            .map_err(|e| LedgerError::Archive(format!("Unreadable entry snapshot {}: {}", archive.id, e)))?;

        if !self.storage.notes.contains(entry.note_id)? {
            return Err(LedgerError::Archive(format!(
                "Cannot restore entry '{}': its note {} no longer exists; restore the note first",
                entry.description, entry.note_id
            )));
        }

        if self.storage.entries.contains(entry.id)? {
            let previous = entry.id;
            entry.id = EntryId::new();
            // Dates already generated under the old id stay covered
            if let Some(recurrence) = entry.recurrence.as_mut() {
                if let Some(last) = self.storage.entries.latest_occurrence(previous)? {
                    recurrence.skip_through(last);
                }
            }
        }
        entry.touch();

        self.storage.entries.upsert(entry.clone())?;
        self.storage.log_restore(
            EntityType::BudgetEntry,
            entry.id.to_string(),
            Some(entry.description.clone()),
            &entry,
        )?;

        let months = BTreeSet::from([Month::of(entry.date)]);
        Ok((Restored::Entry(entry), months))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{EntryType, Frequency, Money};
    use crate::services::{BudgetService, NewEntry, NewNote, NoteService, RecurrenceService};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget_note(storage: &Storage, title: &str) -> Note {
        NoteService::new(storage)
            .create(NewNote {
                title: title.into(),
                is_budget: true,
                ..Default::default()
            })
            .unwrap()
    }

    fn expense(storage: &Storage, note: &Note, cents: i64, on: NaiveDate) -> BudgetEntry {
        BudgetService::new(storage)
            .add(NewEntry {
                date: Some(on),
                ..NewEntry::new(note.id, "Expense", Money::from_cents(cents), EntryType::Expense)
            })
            .unwrap()
    }

    #[test]
    fn test_note_round_trip_restores_entries_and_limits() {
        let (_temp, storage) = create_test_storage();
        let note = budget_note(&storage, "Groceries");
        let entry = expense(&storage, &note, 2000, date(2025, 6, 3));
        let june = Month::new(2025, 6).unwrap();
        let limits = LimitService::new(&storage);
        let limit = limits
            .set(note.category_id, june, Money::from_cents(5000))
            .unwrap();
        assert_eq!(limit.spent, Money::from_cents(2000));

        let archive = NoteService::new(&storage).delete(note.id).unwrap();
        assert!(limits.get(limit.id).unwrap().unwrap().spent.is_zero());

        let service = ArchiveService::new(&storage);
        let restored = service.restore(archive.id).unwrap();

        match restored {
            Restored::Note { note: back, entries, moved_to_default } => {
                assert_eq!(back.id, note.id);
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].id, entry.id);
                assert!(!moved_to_default);
            }
            other => panic!("unexpected restore result: {:?}", other),
        }
        assert_eq!(storage.archives.count().unwrap(), 0);
        assert_eq!(
            limits.get(limit.id).unwrap().unwrap().spent,
            Money::from_cents(2000)
        );
    }

    #[test]
    fn test_restore_with_taken_id_and_missing_category() {
        let (_temp, storage) = create_test_storage();
        let categories = CategoryService::new(&storage);
        let trips = categories.create("Trips", None, None).unwrap();
        let note = NoteService::new(&storage)
            .create(NewNote {
                title: "Paris".into(),
                category_id: Some(trips.id),
                ..Default::default()
            })
            .unwrap();

        let archive = NoteService::new(&storage).delete(note.id).unwrap();
        categories.delete(trips.id).unwrap();
        // Something else now lives under the old id
        storage.notes.upsert(note.clone()).unwrap();

        match ArchiveService::new(&storage).restore(archive.id).unwrap() {
            Restored::Note { note: back, moved_to_default, .. } => {
                assert_ne!(back.id, note.id);
                assert!(moved_to_default);
                let default = storage.categories.get_default().unwrap().unwrap();
                assert_eq!(back.category_id, default.id);
            }
            other => panic!("unexpected restore result: {:?}", other),
        }
    }

    #[test]
    fn test_entry_restore_requires_live_note() {
        let (_temp, storage) = create_test_storage();
        let note = budget_note(&storage, "Coffee");
        let entry = expense(&storage, &note, 350, date(2025, 6, 3));

        let entry_archive = BudgetService::new(&storage).delete(entry.id).unwrap();
        let note_archive = NoteService::new(&storage).delete(note.id).unwrap();

        let service = ArchiveService::new(&storage);
        let err = service.restore(entry_archive.id).unwrap_err();
        assert!(matches!(err, LedgerError::Archive(_)));

        service.restore(note_archive.id).unwrap();
        match service.restore(entry_archive.id).unwrap() {
            Restored::Entry(back) => assert_eq!(back.id, entry.id),
            other => panic!("unexpected restore result: {:?}", other),
        }
    }

    #[test]
    fn test_restore_latest_is_undo() {
        let (_temp, storage) = create_test_storage();
        let first = budget_note(&storage, "First");
        let second = budget_note(&storage, "Second");
        let notes = NoteService::new(&storage);
        notes.delete(first.id).unwrap();
        notes.delete(second.id).unwrap();

        let service = ArchiveService::new(&storage);
        match service.restore_latest().unwrap() {
            Restored::Note { note, .. } => assert_eq!(note.title, "Second"),
            other => panic!("unexpected restore result: {:?}", other),
        }
        service.restore_latest().unwrap();
        assert!(matches!(
            service.restore_latest().unwrap_err(),
            LedgerError::Archive(_)
        ));
    }

    #[test]
    fn test_restored_template_does_not_duplicate_occurrences() {
        let (_temp, storage) = create_test_storage();
        let note = budget_note(&storage, "Bills");
        let rent = BudgetService::new(&storage)
            .add(NewEntry {
                date: Some(date(2025, 1, 5)),
                frequency: Some(Frequency::Monthly),
                ..NewEntry::new(note.id, "Rent", Money::from_cents(90000), EntryType::Expense)
            })
            .unwrap();
        let recurrence = RecurrenceService::new(&storage);
        assert_eq!(recurrence.process_due(date(2025, 3, 10)).unwrap().generated.len(), 2);

        let archive = NoteService::new(&storage).delete(note.id).unwrap();
        ArchiveService::new(&storage).restore(archive.id).unwrap();

        assert!(recurrence.process_due(date(2025, 3, 10)).unwrap().generated.is_empty());
        assert_eq!(storage.entries.count().unwrap(), 3);
        assert!(storage.entries.get(rent.id).unwrap().is_some());
    }

    #[test]
    fn test_renamed_template_skips_covered_dates() {
        let (_temp, storage) = create_test_storage();
        let note = budget_note(&storage, "Bills");
        let budget = BudgetService::new(&storage);
        let rent = budget
            .add(NewEntry {
                date: Some(date(2025, 1, 5)),
                frequency: Some(Frequency::Monthly),
                ..NewEntry::new(note.id, "Rent", Money::from_cents(90000), EntryType::Expense)
            })
            .unwrap();
        let recurrence = RecurrenceService::new(&storage);
        recurrence.process_due(date(2025, 3, 10)).unwrap();

        let archive = budget.delete(rent.id).unwrap();
        // The same template comes back under its id and keeps rolling over
        let live = archive.entry_snapshot().unwrap();
        storage.entries.upsert(live).unwrap();
        assert_eq!(recurrence.process_due(date(2025, 5, 10)).unwrap().generated.len(), 2);

        let restored = match ArchiveService::new(&storage).restore(archive.id).unwrap() {
            Restored::Entry(back) => back,
            other => panic!("unexpected restore result: {:?}", other),
        };
        assert_ne!(restored.id, rent.id);
        assert_eq!(restored.recurrence.unwrap().next_date, date(2025, 6, 5));

        assert!(recurrence.process_due(date(2025, 5, 10)).unwrap().generated.is_empty());
    }

    #[test]
    fn test_purge_variants() {
        let (_temp, storage) = create_test_storage();
        let notes = NoteService::new(&storage);
        let a = budget_note(&storage, "A");
        let b = budget_note(&storage, "B");
        let c = budget_note(&storage, "C");
        let entry = expense(&storage, &c, 100, date(2025, 1, 1));
        BudgetService::new(&storage).delete(entry.id).unwrap();
        let old = notes.delete(a.id).unwrap();
        notes.delete(b.id).unwrap();

        let mut aged = storage.archives.get(old.id).unwrap().unwrap();
        aged.deleted_at = Utc::now() - Duration::days(40);
        storage.archives.insert(aged).unwrap();

        let service = ArchiveService::new(&storage);
        assert_eq!(service.purge_older_than(30, Utc::now()).unwrap(), 1);
        assert_eq!(service.purge_all(Some(ArchiveKind::BudgetEntry)).unwrap(), 1);

        let remaining = service.list(None).unwrap();
        assert_eq!(remaining.len(), 1);
        service.purge(remaining[0].id).unwrap();
        assert!(service.purge(remaining[0].id).unwrap_err().is_not_found());
        assert_eq!(service.purge_all(None).unwrap(), 0);
    }
}
