//! Note service
//!
//! Notes carry free text, an optional voice attachment path and a category.
//! Deleting a note archives it together with its budget entries.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Archive, CategoryId, Month, Note, NoteId};
use crate::storage::Storage;

use super::{CategoryService, LimitService};

/// Service for note management
pub struct NoteService<'a> {
    storage: &'a Storage,
}

/// Fields of a new note
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    /// Defaults to the default category
    pub category_id: Option<CategoryId>,
    pub is_budget: bool,
    pub voice_path: Option<PathBuf>,
}

/// Optional field changes for [`NoteService::update`]
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_budget: Option<bool>,
}

/// Filter for [`NoteService::list`]
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring over title and content
    pub search: Option<String>,
    pub budget_only: bool,
}

impl<'a> NoteService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, new: NewNote) -> LedgerResult<Note> {
        let category_id = match new.category_id {
            Some(id) => self.require_category(id)?,
            None => CategoryService::new(self.storage).ensure_default()?.id,
        };

        let mut note = Note::new(new.title.trim(), new.content, category_id);
        note.is_budget = new.is_budget;
        note.voice_path = new.voice_path;

        note.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.notes.upsert(note.clone())?;
        self.storage.notes.save()?;
        self.storage.log_create(
            EntityType::Note,
            note.id.to_string(),
            Some(note.title.clone()),
            &note,
        )?;
        info!(id = %note.id, "created note");

        Ok(note)
    }

    pub fn get(&self, id: NoteId) -> LedgerResult<Option<Note>> {
        self.storage.notes.get(id)
    }

    /// Find a note by id, short id (`note-1a2b3c4d`) or exact title
    pub fn find(&self, identifier: &str) -> LedgerResult<Note> {
        if let Ok(id) = identifier.parse::<NoteId>() {
            if let Some(note) = self.storage.notes.get(id)? {
                return Ok(note);
            }
        }

        let mut matches = self.storage.notes.find_by_short_id(identifier)?;
        if matches.is_empty() {
            matches = self.storage.notes.find_by_title(identifier)?;
        }

        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(LedgerError::note_not_found(identifier)),
            n => Err(LedgerError::Validation(format!(
                "'{}' matches {} notes; use the note id",
                identifier, n
            ))),
        }
    }

    /// Notes matching `filter`, pinned first, then newest first
    pub fn list(&self, filter: &NoteFilter) -> LedgerResult<Vec<Note>> {
        let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());

        Ok(self
            .storage
            .notes
            .get_all()?
            .into_iter()
            .filter(|n| filter.category_id.map_or(true, |c| n.category_id == c))
            .filter(|n| !filter.budget_only || n.is_budget)
            .filter(|n| search.map_or(true, |q| n.matches(q)))
            .collect())
    }

    pub fn update(&self, id: NoteId, changes: NoteUpdate) -> LedgerResult<Note> {
        let before = self.require(id)?;
        let mut note = before.clone();

        if let Some(title) = changes.title {
            note.title = title.trim().to_string();
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        if let Some(category_id) = changes.category_id {
            note.category_id = self.require_category(category_id)?;
        }
        if let Some(is_budget) = changes.is_budget {
            note.is_budget = is_budget;
        }

        note.validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let moved = note.category_id != before.category_id;
        let note = self.save_update(&before, note)?;
        if moved {
            // Spent totals follow the note's category
            LimitService::new(self.storage).recompute_months(self.entry_months(id)?)?;
        }

        Ok(note)
    }

    /// Record the path of a voice memo; the file itself is not touched
    pub fn attach_voice(&self, id: NoteId, path: PathBuf) -> LedgerResult<Note> {
        if path.as_os_str().is_empty() {
            return Err(LedgerError::Validation("Voice path cannot be empty".into()));
        }
        let before = self.require(id)?;
        let mut note = before.clone();
        note.voice_path = Some(path);
        self.save_update(&before, note)
    }

    pub fn detach_voice(&self, id: NoteId) -> LedgerResult<Note> {
        let before = self.require(id)?;
        if before.voice_path.is_none() {
            return Ok(before);
        }
        let mut note = before.clone();
        note.voice_path = None;
        self.save_update(&before, note)
    }

    pub fn toggle_pin(&self, id: NoteId) -> LedgerResult<Note> {
        let before = self.require(id)?;
        let mut note = before.clone();
        note.is_pinned = !note.is_pinned;
        self.save_update(&before, note)
    }

    /// Archive a note with all of its budget entries, then remove them
    pub fn delete(&self, id: NoteId) -> LedgerResult<Archive> {
        let archive = self.archive_one(id)?;

        self.storage.notes.save()?;
        self.storage.entries.save()?;
        self.storage.archives.save()?;

        Ok(archive)
    }

    /// Archive several notes, saving once
    pub fn delete_many(&self, ids: &[NoteId]) -> LedgerResult<Vec<Archive>> {
        let mut archives = Vec::with_capacity(ids.len());
        let mut failure = None;

        for id in ids {
            match self.archive_one(*id) {
                Ok(archive) => archives.push(archive),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // Persist whatever was archived before a failure
        if !archives.is_empty() {
            self.storage.notes.save()?;
            self.storage.entries.save()?;
            self.storage.archives.save()?;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(archives),
        }
    }

    fn archive_one(&self, id: NoteId) -> LedgerResult<Archive> {
        let note = self.require(id)?;
        let entries = self.storage.entries.get_by_note(id)?;

        let archive = Archive::of_note(&note, &entries)?;
        self.storage.archives.insert(archive.clone())?;
        self.storage.entries.delete_by_note(id)?;
        self.storage.notes.delete(id)?;

        let months: BTreeSet<Month> = entries.iter().map(|e| Month::of(e.date)).collect();
        LimitService::new(self.storage).recompute_months(months)?;

        self.storage.log_archive(
            EntityType::Note,
            id.to_string(),
            Some(note.title.clone()),
            &note,
        )?;
        debug!(id = %id, entries = entries.len(), archive = %archive.id, "archived note");

        Ok(archive)
    }

    fn save_update(&self, before: &Note, mut note: Note) -> LedgerResult<Note> {
        note.touch();
        self.storage.notes.upsert(note.clone())?;
        self.storage.notes.save()?;
        self.storage.log_update(
            EntityType::Note,
            note.id.to_string(),
            Some(note.title.clone()),
            before,
            &note,
        )?;
        Ok(note)
    }

    fn require(&self, id: NoteId) -> LedgerResult<Note> {
        self.storage
            .notes
            .get(id)?
            .ok_or_else(|| LedgerError::note_not_found(id.to_string()))
    }

    fn require_category(&self, id: CategoryId) -> LedgerResult<CategoryId> {
        match self.storage.categories.get(id)? {
            Some(category) => Ok(category.id),
            None => Err(LedgerError::category_not_found(id.to_string())),
        }
    }

    fn entry_months(&self, id: NoteId) -> LedgerResult<BTreeSet<Month>> {
        Ok(self
            .storage
            .entries
            .get_by_note(id)?
            .iter()
            .map(|e| Month::of(e.date))
            .collect())
    }
}
