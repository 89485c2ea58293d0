//! Category model
//!
//! Notes are tagged with exactly one category. One category is marked as the
//! default and can never be deleted; budget limits are set per category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;

/// Title of the category created on first run
pub const DEFAULT_CATEGORY_TITLE: &str = "Budget";

/// A note category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub title: String,

    /// The default category receives notes whose category disappears
    #[serde(default)]
    pub is_default: bool,

    /// Sort order for display
    #[serde(default)]
    pub sort_order: i32,

    /// Display color (e.g. "#FF6200EE")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Display icon name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            title: title.into(),
            is_default: false,
            sort_order: 0,
            color: None,
            icon: None,
            created_at: Utc::now(),
        }
    }

    /// Create the default category
    pub fn default_category() -> Self {
        let mut category = Self::new(DEFAULT_CATEGORY_TITLE);
        category.is_default = true;
        category
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.title.trim().is_empty() {
            return Err(CategoryValidationError::EmptyTitle);
        }

        if self.title.chars().count() > 50 {
            return Err(CategoryValidationError::TitleTooLong(self.title.chars().count()));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyTitle,
    TitleTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Category title cannot be empty"),
            Self::TitleTooLong(len) => {
                write!(f, "Category title too long ({} chars, max 50)", len)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
