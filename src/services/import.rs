//! Merge import of a full export
//!
//! Records whose id already exists locally are skipped, so importing the same
//! file twice changes nothing the second time. Records that fail their model
//! validation are left out and counted as invalid.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use argon2::password_hash::PasswordHash;
use tracing::{info, warn};

use crate::audit::{AuditEntry, EntityType};
use crate::error::LedgerResult;
use crate::export::{read_export_file, FullExport};
use crate::models::CategoryId;
use crate::storage::{Storage, PASSCODE_KEY};

use super::{CategoryService, LimitService};

/// Imported and skipped record counts for one record kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCount {
    pub imported: usize,
    pub skipped: usize,
    pub invalid: usize,
}

impl KindCount {
    fn add(&mut self, imported: bool) {
        if imported {
            self.imported += 1;
        } else {
            self.skipped += 1;
        }
    }

    fn reject(&mut self, kind: &str, id: impl fmt::Display, reason: impl fmt::Display) {
        warn!(kind, id = %id, reason = %reason, "ignoring invalid record in import");
        self.invalid += 1;
    }
}

impl fmt::Display for KindCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} imported, {} skipped", self.imported, self.skipped)?;
        if self.invalid > 0 {
            write!(f, ", {} invalid", self.invalid)?;
        }
        Ok(())
    }
}

/// Outcome of a merge import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub categories: KindCount,
    pub notes: KindCount,
    pub entries: KindCount,
    pub limits: KindCount,
    pub archives: KindCount,
    pub preferences: KindCount,
    /// Notes whose category was not found and went to the default category
    pub notes_moved_to_default: usize,
}

impl ImportResult {
    pub fn total_imported(&self) -> usize {
        self.categories.imported
            + self.notes.imported
            + self.entries.imported
            + self.limits.imported
            + self.archives.imported
            + self.preferences.imported
    }
}

/// Service merging exports into local data
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Read `path` (refusing files over `max_bytes`) and merge it
    pub fn import_file(&self, path: &Path, max_bytes: u64) -> LedgerResult<ImportResult> {
        let export = read_export_file(path, max_bytes)?;
        info!(path = %path.display(), schema = %export.schema_version, "importing export file");
        self.merge(export)
    }

    /// Merge an already parsed export
    pub fn merge(&self, export: FullExport) -> LedgerResult<ImportResult> {
        let mut result = ImportResult::default();
        let mut audit = Vec::new();

        let category_map = self.merge_categories(&export, &mut result, &mut audit)?;
        let default_id = CategoryService::new(self.storage).ensure_default()?.id;

        // Notes
        for mut note in export.notes {
            if let Err(e) = note.validate() {
                result.notes.reject("note", note.id, e);
                continue;
            }
            if self.storage.notes.contains(note.id)? {
                result.notes.add(false);
                continue;
            }
            match category_map.get(&note.category_id) {
                Some(local) => note.category_id = *local,
                None => {
                    note.category_id = default_id;
                    result.notes_moved_to_default += 1;
                }
            }
            audit.push(AuditEntry::create(
                EntityType::Note,
                note.id.to_string(),
                Some(note.title.clone()),
                &note,
            ));
            self.storage.notes.upsert(note)?;
            result.notes.add(true);
        }

        // Entries, only under notes that exist after the note merge
        for entry in export.budget_entries {
            if let Err(e) = entry.validate() {
                result.entries.reject("budget entry", entry.id, e);
                continue;
            }
            if self.storage.entries.contains(entry.id)? || !self.storage.notes.contains(entry.note_id)? {
                result.entries.add(false);
                continue;
            }
            audit.push(AuditEntry::create(
                EntityType::BudgetEntry,
                entry.id.to_string(),
                Some(entry.description.clone()),
                &entry,
            ));
            self.storage.entries.upsert(entry)?;
            result.entries.add(true);
        }

        // Limits, one per category and month
        for mut limit in export.budget_limits {
            if let Err(e) = limit.validate() {
                result.limits.reject("budget limit", limit.id, e);
                continue;
            }
            let Some(local) = category_map.get(&limit.category_id).copied() else {
                result.limits.add(false);
                continue;
            };
            limit.category_id = local;
            if self.storage.limits.get(limit.id)?.is_some()
                || self.storage.limits.get_for(local, limit.month)?.is_some()
            {
                result.limits.add(false);
                continue;
            }
            audit.push(AuditEntry::create(
                EntityType::BudgetLimit,
                limit.id.to_string(),
                None,
                &limit,
            ));
            self.storage.limits.upsert(limit)?;
            result.limits.add(true);
        }

        for archive in export.archives {
            if !archive.is_readable() {
                result.archives.reject("archive", archive.id, "unreadable snapshot");
                continue;
            }
            if self.storage.archives.contains(archive.id)? {
                result.archives.add(false);
                continue;
            }
            audit.push(AuditEntry::create(
                EntityType::Archive,
                archive.id.to_string(),
                Some(archive.label()),
                &archive,
            ));
            self.storage.archives.insert(archive)?;
            result.archives.add(true);
        }

        self.merge_preferences(export.preferences, &mut result)?;

        self.storage.save_all()?;
        self.storage.log_batch(&audit)?;
        LimitService::new(self.storage).recompute_all()?;

        info!(imported = result.total_imported(), "import finished");
        Ok(result)
    }

    /// Merge categories; returns a map from imported category id to local id
    fn merge_categories(
        &self,
        export: &FullExport,
        result: &mut ImportResult,
        audit: &mut Vec<AuditEntry>,
    ) -> LedgerResult<HashMap<CategoryId, CategoryId>> {
        let mut map = HashMap::new();
        for local in self.storage.categories.get_all()? {
            map.insert(local.id, local.id);
        }

        let mut next_order = self
            .storage
            .categories
            .get_all()?
            .iter()
            .map(|c| c.sort_order)
            .max()
            .unwrap_or(-1)
            + 1;
        let has_default = self.storage.categories.get_default()?.is_some();
        let mut seen_default = false;

        for category in &export.categories {
            if let Err(e) = category.validate() {
                result.categories.reject("category", category.id, e);
                continue;
            }
            if map.contains_key(&category.id) {
                result.categories.add(false);
                continue;
            }
            // Same title under another id: fold into the local category
            if let Some(local) = self.storage.categories.get_by_title(&category.title)? {
                map.insert(category.id, local.id);
                result.categories.add(false);
                continue;
            }

            let mut category = category.clone();
            if category.is_default && (has_default || seen_default) {
                category.is_default = false;
            }
            seen_default |= category.is_default;
            category.sort_order = next_order;
            next_order += 1;

            map.insert(category.id, category.id);
            audit.push(AuditEntry::create(
                EntityType::Category,
                category.id.to_string(),
                Some(category.title.clone()),
                &category,
            ));
            self.storage.categories.upsert(category)?;
            result.categories.add(true);
        }

        Ok(map)
    }

    fn merge_preferences(
        &self,
        preferences: BTreeMap<String, String>,
        result: &mut ImportResult,
    ) -> LedgerResult<()> {
        for (key, value) in preferences {
            if key == PASSCODE_KEY {
                if self.storage.preferences.contains(PASSCODE_KEY)? {
                    result.preferences.add(false);
                    continue;
                }
                if PasswordHash::new(&value).is_err() {
                    warn!("ignoring malformed passcode hash in import");
                    result.preferences.add(false);
                    continue;
                }
            }
            let changed = self.storage.preferences.get(&key)?.as_deref() != Some(value.as_str());
            if changed {
                self.storage.preferences.set(key, value)?;
            }
            result.preferences.add(changed);
        }
        Ok(())
    }
}
