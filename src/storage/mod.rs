//! Storage layer for LedgerNote
//!
//! JSON files with atomic writes, held in memory by one repository per
//! record type and coordinated by [`Storage`].

pub mod archives;
pub mod categories;
pub mod entries;
pub mod file_io;
pub mod init;
pub mod limits;
pub mod notes;
pub mod preferences;

pub use archives::ArchiveRepository;
pub use categories::CategoryRepository;
pub use entries::EntryRepository;
pub use file_io::{read_json, read_to_string_limited, write_json_atomic};
pub use init::initialize_storage;
pub use limits::LimitRepository;
pub use notes::NoteRepository;
pub use preferences::{PreferenceRepository, PASSCODE_KEY, THEME_KEY};

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::LedgerPaths;
use crate::error::{LedgerError, LedgerResult};

pub(crate) fn lock_err<E: std::fmt::Display>(e: E) -> LedgerError {
    LedgerError::Storage(format!("Failed to acquire lock: {}", e))
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: LedgerPaths,
    pub notes: NoteRepository,
    pub categories: CategoryRepository,
    pub entries: EntryRepository,
    pub limits: LimitRepository,
    pub archives: ArchiveRepository,
    pub preferences: PreferenceRepository,
    audit: AuditLogger,
    audit_enabled: bool,
}

impl Storage {
    /// Create a new Storage instance, creating directories as needed
    pub fn new(paths: LedgerPaths) -> Result<Self, LedgerError> {
        paths.ensure_directories()?;

        Ok(Self {
            notes: NoteRepository::new(paths.notes_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            entries: EntryRepository::new(paths.entries_file()),
            limits: LimitRepository::new(paths.limits_file()),
            archives: ArchiveRepository::new(paths.archives_file()),
            preferences: PreferenceRepository::new(paths.preferences_file()),
            audit: AuditLogger::new(paths.audit_log()),
            audit_enabled: true,
            paths,
        })
    }

    pub fn paths(&self) -> &LedgerPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Turn audit logging on or off (from `Settings::audit_enabled`)
    pub fn set_audit_enabled(&mut self, enabled: bool) {
        self.audit_enabled = enabled;
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), LedgerError> {
        self.notes.load()?;
        self.categories.load()?;
        self.entries.load()?;
        self.limits.load()?;
        self.archives.load()?;
        self.preferences.load()?;
        tracing::debug!(base = %self.paths.base_dir().display(), "loaded data files");
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), LedgerError> {
        self.notes.save()?;
        self.categories.save()?;
        self.entries.save()?;
        self.limits.save()?;
        self.archives.save()?;
        self.preferences.save()?;
        Ok(())
    }

    /// Check if `ledgernote init` has been run
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    fn write_audit(&self, entry: AuditEntry) -> LedgerResult<()> {
        if self.audit_enabled {
            self.audit.log(&entry)?;
        }
        Ok(())
    }

    /// Write several pre-built entries with one flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> LedgerResult<()> {
        if self.audit_enabled {
            self.audit.log_batch(entries)?;
        }
        Ok(())
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.write_audit(AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> LedgerResult<()> {
        self.write_audit(AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.write_audit(AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_archive<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.write_audit(AuditEntry::archive(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_restore<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> LedgerResult<()> {
        self.write_audit(AuditEntry::restore(entity_type, entity_id, entity_name, entity))
    }
}
