//! Note repository for JSON storage
//!
//! Manages loading and saving notes to notes.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{CategoryId, Note, NoteId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct NoteData {
    notes: Vec<Note>,
}

/// Pinned notes first, then newest first
fn display_order(a: &Note, b: &Note) -> std::cmp::Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then(b.created_at.cmp(&a.created_at))
}

/// Repository for note persistence
pub struct NoteRepository {
    path: PathBuf,
    data: RwLock<HashMap<NoteId, Note>>,
}

impl NoteRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load notes from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: NoteData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_err)?;

        data.clear();
        for note in file_data.notes {
            data.insert(note.id, note);
        }

        Ok(())
    }

    /// Save notes to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_err)?;

        let mut notes: Vec<_> = data.values().cloned().collect();
        notes.sort_by(display_order);

        write_json_atomic(&self.path, &NoteData { notes })
    }

    pub fn get(&self, id: NoteId) -> Result<Option<Note>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(&id).cloned())
    }

    pub fn contains(&self, id: NoteId) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(&id))
    }

    /// Get all notes, pinned first, then newest first
    pub fn get_all(&self) -> Result<Vec<Note>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut notes: Vec<_> = data.values().cloned().collect();
        notes.sort_by(display_order);
        Ok(notes)
    }

    /// Find notes whose title matches exactly (case-insensitive)
    pub fn find_by_title(&self, title: &str) -> Result<Vec<Note>, LedgerError> {
        let title = title.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|n| n.title.to_lowercase() == title)
            .collect())
    }

    /// Find notes whose short id (e.g. `note-1a2b3c4d`) matches
    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<Note>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|n| n.id.matches_short(short))
            .cloned()
            .collect())
    }

    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Note>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|n| n.category_id == category_id)
            .collect())
    }

    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.values().filter(|n| n.category_id == category_id).count())
    }

    /// Insert or update a note
    pub fn upsert(&self, note: Note) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        data.insert(note.id, note);
        Ok(())
    }

    /// Remove a note, returning it if it existed
    pub fn delete(&self, id: NoteId) -> Result<Option<Note>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.len())
    }
}
