//! Backups for LedgerNote
//!
//! A backup is a full JSON export written to `backups/` under a timestamped
//! name (`backup-YYYYMMDD-HHMMSS-mmm.json`). Restoring a backup merges it into
//! the current data like an import.
//!
//! Retention keeps the newest `daily_count` backups plus the first backup of
//! each of the newest `monthly_count` months.

mod manager;
mod restore;

pub use manager::{BackupInfo, BackupManager};
pub use restore::{RestoreManager, ValidationResult};
