//! Custom error types for LedgerNote
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for LedgerNote operations
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Budget-related errors
    #[error("Budget error: {0}")]
    Budget(String),

    /// Archive/restore errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Passcode errors (bad format, mismatch, wrong passcode)
    #[error("Passcode error: {0}")]
    Passcode(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Create a "not found" error for notes
    pub fn note_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Note",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget entries
    pub fn entry_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget entry",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budget limits
    pub fn limit_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget limit",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for archive records
    pub fn archive_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Archive",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for LedgerNote operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LedgerError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = LedgerError::note_not_found("Groceries list");
        assert_eq!(err.to_string(), "Note not found: Groceries list");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_entry_not_found_error() {
        let err = LedgerError::entry_not_found("ent-1234abcd");
        assert_eq!(err.to_string(), "Budget entry not found: ent-1234abcd");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LedgerError = io_err.into();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
