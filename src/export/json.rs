//! JSON export of the complete data set, with schema versioning

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Archive, BudgetEntry, BudgetLimit, Category, Note};
use crate::storage::Storage;

/// Current export schema version; imports accept any version with the same major
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full data set export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    /// Version of ledgernote that wrote the file
    pub app_version: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub budget_entries: Vec<BudgetEntry>,
    #[serde(default)]
    pub budget_limits: Vec<BudgetLimit>,
    #[serde(default)]
    pub archives: Vec<Archive>,
    /// Key/value preferences (theme, passcode hash)
    #[serde(default)]
    pub preferences: BTreeMap<String, String>,
    pub metadata: ExportMetadata,
}

/// Counts and date range, for reference when inspecting a file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub note_count: usize,
    pub category_count: usize,
    pub entry_count: usize,
    pub limit_count: usize,
    pub archive_count: usize,
    pub earliest_entry: Option<String>,
    pub latest_entry: Option<String>,
}

fn major(version: &str) -> Option<u64> {
    version.split('.').next()?.trim().parse().ok()
}

fn first_duplicate<T, K, F>(items: &[T], key: F) -> Option<K>
where
    K: Eq + Hash + Copy,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items.iter().map(key).find(|k| !seen.insert(*k))
}

impl FullExport {
    /// Snapshot everything held by `storage`
    pub fn from_storage(storage: &Storage) -> LedgerResult<Self> {
        let notes = storage.notes.get_all()?;
        let categories = storage.categories.get_all()?;
        let budget_entries = storage.entries.get_all()?;
        let budget_limits = storage.limits.get_all()?;
        let archives = storage.archives.get_all()?;
        let preferences = storage.preferences.all()?;

        let metadata = ExportMetadata {
            note_count: notes.len(),
            category_count: categories.len(),
            entry_count: budget_entries.len(),
            limit_count: budget_limits.len(),
            archive_count: archives.len(),
            earliest_entry: budget_entries.iter().map(|e| e.date).min().map(|d| d.to_string()),
            latest_entry: budget_entries.iter().map(|e| e.date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            notes,
            categories,
            budget_entries,
            budget_limits,
            archives,
            preferences,
            metadata,
        })
    }

    /// Check the schema version and that no id appears twice
    pub fn validate(&self) -> Result<(), String> {
        match (major(&self.schema_version), major(EXPORT_SCHEMA_VERSION)) {
            (Some(found), Some(expected)) if found == expected => {}
            _ => {
                return Err(format!(
                    "Unsupported schema version {} (this build reads {}.x)",
                    self.schema_version,
                    major(EXPORT_SCHEMA_VERSION).unwrap_or_default()
                ))
            }
        }

        if let Some(id) = first_duplicate(&self.notes, |n| n.id) {
            return Err(format!("Duplicate note id {}", id));
        }
        if let Some(id) = first_duplicate(&self.categories, |c| c.id) {
            return Err(format!("Duplicate category id {}", id));
        }
        if let Some(id) = first_duplicate(&self.budget_entries, |e| e.id) {
            return Err(format!("Duplicate budget entry id {}", id));
        }
        if let Some(id) = first_duplicate(&self.budget_limits, |l| l.id) {
            return Err(format!("Duplicate budget limit id {}", id));
        }
        if let Some(id) = first_duplicate(&self.archives, |a| a.id) {
            return Err(format!("Duplicate archive id {}", id));
        }

        Ok(())
    }
}

/// Write the full data set as JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| LedgerError::Export(e.to_string()))
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> LedgerResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| LedgerError::Import(e.to_string()))?;

    export.validate().map_err(LedgerError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{EntryType, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) {
        let category = Category::default_category();
        storage.categories.upsert(category.clone()).unwrap();
        let note = Note::budget("Groceries", category.id);
        storage.notes.upsert(note.clone()).unwrap();
        for (day, cents) in [(3, 1200), (17, 800)] {
            storage
                .entries
                .upsert(BudgetEntry::new(
                    note.id,
                    NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
                    "Market",
                    EntryType::Expense,
                    Money::from_cents(cents),
                ))
                .unwrap();
        }
        storage.preferences.set("theme", "dark").unwrap();
    }

    #[test]
    fn test_full_export_metadata() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let export = FullExport::from_storage(&storage).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.note_count, 1);
        assert_eq!(export.metadata.entry_count, 2);
        assert_eq!(export.metadata.earliest_entry.as_deref(), Some("2025-02-03"));
        assert_eq!(export.metadata.latest_entry.as_deref(), Some("2025-02-17"));
        assert_eq!(export.preferences.get("theme").map(String::as_str), Some("dark"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_export_then_parse() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut buffer = Vec::new();
        export_full_json(&storage, &mut buffer, false).unwrap();
        let parsed = import_from_json(&String::from_utf8(buffer).unwrap()).unwrap();

        assert_eq!(parsed.budget_entries.len(), 2);
        assert_eq!(parsed.notes[0].title, "Groceries");
    }

    #[test]
    fn test_schema_major_version_checked() {
        let (_temp_dir, storage) = create_test_storage();
        let mut export = FullExport::from_storage(&storage).unwrap();

        export.schema_version = "1.4.0".into();
        assert!(export.validate().is_ok());

        export.schema_version = "2.0.0".into();
        assert!(export.validate().unwrap_err().contains("Unsupported schema version"));

        export.schema_version = "garbage".into();
        assert!(export.validate().is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);
        let mut export = FullExport::from_storage(&storage).unwrap();
        let note = export.notes[0].clone();
        export.notes.push(note);

        assert!(export.validate().unwrap_err().starts_with("Duplicate note id"));
    }

    #[test]
    fn test_malformed_json_is_import_error() {
        let err = import_from_json("{ not json").unwrap_err();
        assert!(matches!(err, LedgerError::Import(_)));
    }
}
