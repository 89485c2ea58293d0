//! Note model
//!
//! A note is a titled text entry tagged with a category. Budget notes group
//! income/expense entries; a note may reference a voice recording by path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::ids::{CategoryId, NoteId};

/// Maximum note title length, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// A text note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,

    pub title: String,

    #[serde(default)]
    pub content: String,

    pub category_id: CategoryId,

    /// Path of an attached voice recording, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_path: Option<PathBuf>,

    /// Whether this note holds budget entries
    #[serde(default)]
    pub is_budget: bool,

    /// Pinned notes sort before all others
    #[serde(default)]
    pub is_pinned: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new note
    pub fn new(title: impl Into<String>, content: impl Into<String>, category_id: CategoryId) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            title: title.into(),
            content: content.into(),
            category_id,
            voice_path: None,
            is_budget: false,
            is_pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new budget note
    pub fn budget(title: impl Into<String>, category_id: CategoryId) -> Self {
        let mut note = Self::new(title, "", category_id);
        note.is_budget = true;
        note
    }

    /// Case-insensitive substring match over title and content
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.content.to_lowercase().contains(&query)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the note
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }

        let len = self.title.chars().count();
        if len > MAX_TITLE_LEN {
            return Err(NoteValidationError::TitleTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for NoteValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Note title cannot be empty"),
            Self::TitleTooLong(len) => write!(
                f,
                "Note title too long ({} chars, max {})",
                len, MAX_TITLE_LEN
            ),
        }
    }
}

impl std::error::Error for NoteValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_note() {
        let category_id = CategoryId::new();
        let note = Note::new("Shopping", "milk, eggs", category_id);
        assert_eq!(note.category_id, category_id);
        assert!(!note.is_budget);
        assert!(!note.is_pinned);
        assert!(note.voice_path.is_none());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let note = Note::new("Weekly Groceries", "Buy RICE and beans", CategoryId::new());
        assert!(note.matches("groceries"));
        assert!(note.matches("rice"));
        assert!(!note.matches("rent"));
    }

    #[test]
    fn test_validation() {
        let mut note = Note::budget("March", CategoryId::new());
        assert!(note.validate().is_ok());

        note.title = String::new();
        assert_eq!(note.validate(), Err(NoteValidationError::EmptyTitle));

        note.title = "x".repeat(MAX_TITLE_LEN + 1);
        assert!(matches!(
            note.validate(),
            Err(NoteValidationError::TitleTooLong(_))
        ));
    }
}
