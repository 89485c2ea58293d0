//! Archive model
//!
//! Deleting a note or budget entry never destroys it outright: the record is
//! serialized into an archive row holding its JSON snapshot, from which it can
//! be restored until the archive is purged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entry::BudgetEntry;
use super::ids::ArchiveId;
use super::note::Note;

/// What kind of record an archive holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    Note,
    BudgetEntry,
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Note => write!(f, "note"),
            Self::BudgetEntry => write!(f, "budget"),
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "note" | "notes" => Ok(Self::Note),
            "budget" | "entry" | "entries" | "budget_entry" => Ok(Self::BudgetEntry),
            other => Err(format!("Unknown archive kind '{}': expected note or budget", other)),
        }
    }
}

/// Snapshot of a deleted note together with the entries it owned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteSnapshot {
    pub note: Note,
    #[serde(default)]
    pub entries: Vec<BudgetEntry>,
}

/// An archived (soft-deleted) record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archive {
    pub id: ArchiveId,

    pub kind: ArchiveKind,

    /// Serialized snapshot; a `NoteSnapshot` or a `BudgetEntry` per `kind`
    pub data_json: String,

    pub deleted_at: DateTime<Utc>,
}

impl Archive {
    /// Archive a note and its entries
    pub fn of_note(note: &Note, entries: &[BudgetEntry]) -> Result<Self, serde_json::Error> {
        let snapshot = NoteSnapshot {
            note: note.clone(),
            entries: entries.to_vec(),
        };
        Ok(Self {
            id: ArchiveId::new(),
            kind: ArchiveKind::Note,
            data_json: serde_json::to_string(&snapshot)?,
            deleted_at: Utc::now(),
        })
    }

    /// Archive a single budget entry
    pub fn of_entry(entry: &BudgetEntry) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: ArchiveId::new(),
            kind: ArchiveKind::BudgetEntry,
            data_json: serde_json::to_string(entry)?,
            deleted_at: Utc::now(),
        })
    }

    pub fn note_snapshot(&self) -> Result<NoteSnapshot, serde_json::Error> {
        serde_json::from_str(&self.data_json)
    }

    pub fn entry_snapshot(&self) -> Result<BudgetEntry, serde_json::Error> {
        serde_json::from_str(&self.data_json)
    }

    /// Whether the snapshot parses as the record its kind names
    pub fn is_readable(&self) -> bool {
        match self.kind {
            ArchiveKind::Note => self.note_snapshot().is_ok(),
            ArchiveKind::BudgetEntry => self.entry_snapshot().is_ok(),
        }
    }

    /// Short human-readable label of the archived record
    pub fn label(&self) -> String {
        match self.kind {
            ArchiveKind::Note => self
                .note_snapshot()
                .map(|s| match s.entries.len() {
                    0 => s.note.title,
                    n => format!("{} (+{} entries)", s.note.title, n),
                })
                .unwrap_or_else(|_| "(unreadable snapshot)".to_string()),
            ArchiveKind::BudgetEntry => self
                .entry_snapshot()
                .map(|e| format!("{} {} {}", e.date, e.description, e.amount))
                .unwrap_or_else(|_| "(unreadable snapshot)".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, EntryType, Money};
    use chrono::NaiveDate;

    #[test]
    fn test_note_snapshot_round_trip() {
        let note = Note::budget("January", CategoryId::new());
        let entry = BudgetEntry::new(
            note.id,
            NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
            "Groceries",
            EntryType::Expense,
            Money::from_cents(4200),
        );

        let archive = Archive::of_note(&note, std::slice::from_ref(&entry)).unwrap();
        assert_eq!(archive.kind, ArchiveKind::Note);
        assert!(archive.is_readable());

        let snapshot = archive.note_snapshot().unwrap();
        assert_eq!(snapshot.note, note);
        assert_eq!(snapshot.entries, vec![entry]);
        assert_eq!(archive.label(), "January (+1 entries)");
    }

    #[test]
    fn test_corrupt_snapshot_label() {
        let archive = Archive {
            id: ArchiveId::new(),
            kind: ArchiveKind::BudgetEntry,
            data_json: "{not json".into(),
            deleted_at: Utc::now(),
        };
        assert!(archive.entry_snapshot().is_err());
        assert!(!archive.is_readable());
        assert_eq!(archive.label(), "(unreadable snapshot)");
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("budget".parse::<ArchiveKind>().unwrap(), ArchiveKind::BudgetEntry);
        assert_eq!("Note".parse::<ArchiveKind>().unwrap(), ArchiveKind::Note);
        assert!("photo".parse::<ArchiveKind>().is_err());
    }
}
