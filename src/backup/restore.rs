//! Restoring backups
//!
//! A restore is a merge: records already present locally are kept as they
//! are, and everything else in the backup is added back.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::LedgerResult;
use crate::export::{read_export_file, FullExport};
use crate::services::{ImportResult, ImportService};
use crate::storage::Storage;

/// Restores backups into a loaded storage
pub struct RestoreManager<'a> {
    storage: &'a Storage,
    max_bytes: u64,
}

impl<'a> RestoreManager<'a> {
    pub fn new(storage: &'a Storage, max_bytes: u64) -> Self {
        Self { storage, max_bytes }
    }

    /// Merge the backup at `backup_path` into the current data
    pub fn restore_from_file(&self, backup_path: &Path) -> LedgerResult<ImportResult> {
        let export = read_export_file(backup_path, self.max_bytes)?;
        let result = ImportService::new(self.storage).merge(export)?;
        info!(
            path = %backup_path.display(),
            imported = result.total_imported(),
            "restored backup"
        );
        Ok(result)
    }

    /// Parse and check a backup without touching any data
    pub fn validate_backup(&self, backup_path: &Path) -> LedgerResult<ValidationResult> {
        let export = read_export_file(backup_path, self.max_bytes)?;
        Ok(ValidationResult::from(&export))
    }
}

/// What a valid backup contains
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub schema_version: String,
    pub backup_date: DateTime<Utc>,
    pub notes: usize,
    pub categories: usize,
    pub entries: usize,
    pub limits: usize,
    pub archives: usize,
    pub has_passcode: bool,
}

impl From<&FullExport> for ValidationResult {
    fn from(export: &FullExport) -> Self {
        Self {
            schema_version: export.schema_version.clone(),
            backup_date: export.exported_at,
            notes: export.notes.len(),
            categories: export.categories.len(),
            entries: export.budget_entries.len(),
            limits: export.budget_limits.len(),
            archives: export.archives.len(),
            has_passcode: export.preferences.contains_key(crate::storage::PASSCODE_KEY),
        }
    }
}

impl ValidationResult {
    pub fn is_empty(&self) -> bool {
        self.notes + self.categories + self.entries + self.limits + self.archives == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "Backup v{} from {}: {} notes, {} categories, {} entries, {} limits, {} archived",
            self.schema_version,
            self.backup_date.format("%Y-%m-%d %H:%M:%S"),
            self.notes,
            self.categories,
            self.entries,
            self.limits,
            self.archives
        )
    }
}
