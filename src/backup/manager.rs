//! Backup creation, listing and retention

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::{debug, info};

use crate::config::paths::LedgerPaths;
use crate::config::settings::BackupRetention;
use crate::error::{LedgerError, LedgerResult};
use crate::export::FullExport;
use crate::storage::file_io::write_atomic_with;
use crate::storage::Storage;

const PREFIX: &str = "backup-";
const SUFFIX: &str = ".json";

/// Metadata about one backup file
#[derive(Debug, Clone)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// First backup of its calendar month; kept under the monthly quota
    pub is_monthly: bool,
}

/// Creates backups and applies the retention policy
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: &LedgerPaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            retention,
        }
    }

    /// Write a full export of `storage` to a new backup file
    pub fn create_backup(&self, storage: &Storage) -> LedgerResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to create backup directory: {}", e)))?;

        let export = FullExport::from_storage(storage)?;
        let now = export.exported_at;
        let filename = format!(
            "{}{}-{:03}{}",
            PREFIX,
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis(),
            SUFFIX
        );
        let path = self.backup_dir.join(filename);

        write_atomic_with(&path, |writer| {
            serde_json::to_writer_pretty(writer, &export)
                .map_err(|e| LedgerError::Json(format!("Failed to serialize backup: {}", e)))
        })?;

        info!(path = %path.display(), "created backup");
        Ok(path)
    }

    /// All backups, newest first
    pub fn list_backups(&self) -> LedgerResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        let entries = fs::read_dir(&self.backup_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to read backup directory: {}", e)))?;
        for entry in entries {
            let entry =
                entry.map_err(|e| LedgerError::Io(format!("Failed to read directory entry: {}", e)))?;
            if let Some(info) = parse_backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        // Mark the oldest backup of each month
        backups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut months_seen = HashSet::new();
        for backup in &mut backups {
            backup.is_monthly =
                months_seen.insert((backup.created_at.year(), backup.created_at.month()));
        }
        backups.reverse();

        Ok(backups)
    }

    /// Delete backups beyond the retention policy; returns the deleted paths
    pub fn enforce_retention(&self) -> LedgerResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;

        let (monthly, daily): (Vec<_>, Vec<_>) = backups.into_iter().partition(|b| b.is_monthly);

        let expired = daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        let mut deleted = Vec::new();
        for backup in expired {
            fs::remove_file(&backup.path)
                .map_err(|e| LedgerError::Io(format!("Failed to delete old backup: {}", e)))?;
            debug!(file = %backup.filename, "removed expired backup");
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce retention
    pub fn create_backup_with_retention(&self, storage: &Storage) -> LedgerResult<(PathBuf, Vec<PathBuf>)> {
        let path = self.create_backup(storage)?;
        let deleted = self.enforce_retention()?;
        Ok((path, deleted))
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Look up a backup by file name, or `latest`
    pub fn get_backup(&self, name: &str) -> LedgerResult<Option<BackupInfo>> {
        if name.eq_ignore_ascii_case("latest") {
            return self.get_latest_backup();
        }
        Ok(self
            .list_backups()?
            .into_iter()
            .find(|b| b.filename == name || b.filename.trim_end_matches(SUFFIX) == name))
    }

    pub fn get_latest_backup(&self) -> LedgerResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_str()?.to_string();
    let stamp = filename.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    let created_at = parse_backup_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: false,
    })
}

/// Parse `YYYYMMDD-HHMMSS` with an optional `-mmm` millisecond suffix
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let mut parts = stamp.split('-');
    let date = parts.next()?;
    let time = parts.next()?;
    let millis: u32 = match parts.next() {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    if time.len() != 6 {
        return None;
    }
    let hour = time.get(0..2)?.parse().ok()?;
    let minute = time.get(2..4)?.parse().ok()?;
    let second = time.get(4..6)?.parse().ok()?;
    let time = NaiveTime::from_hms_milli_opt(hour, minute, second, millis)?;

    Some(NaiveDateTime::new(date, time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Note};
    use tempfile::TempDir;

    fn create_test_setup() -> (TempDir, Storage, BackupManager) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();
        let manager = BackupManager::new(
            &paths,
            BackupRetention {
                daily_count: 2,
                monthly_count: 1,
            },
        );
        (temp_dir, storage, manager)
    }

    fn fake_backup(manager: &BackupManager, stamp: &str) -> PathBuf {
        fs::create_dir_all(manager.backup_dir()).unwrap();
        let path = manager.backup_dir().join(format!("backup-{}.json", stamp));
        fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_create_backup_contains_export() {
        let (_temp, storage, manager) = create_test_setup();
        let category = Category::new("Ideas");
        storage.categories.upsert(category.clone()).unwrap();
        storage.notes.upsert(Note::new("Book list", "", category.id)).unwrap();

        let path = manager.create_backup(&storage).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let export = crate::export::import_from_json(&contents).unwrap();

        assert_eq!(export.notes.len(), 1);
        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_list_ignores_unrelated_files() {
        let (_temp, _storage, manager) = create_test_setup();
        fake_backup(&manager, "20250102-080000-000");
        fs::write(manager.backup_dir().join("notes.txt"), "x").unwrap();
        fs::write(manager.backup_dir().join("backup-garbage.json"), "{}").unwrap();

        assert_eq!(manager.list_backups().unwrap().len(), 1);
    }

    #[test]
    fn test_monthly_flag_marks_first_of_month() {
        let (_temp, _storage, manager) = create_test_setup();
        fake_backup(&manager, "20250105-080000-000");
        fake_backup(&manager, "20250103-080000-000");
        fake_backup(&manager, "20250201-080000");

        let backups = manager.list_backups().unwrap();
        let flags: Vec<(String, bool)> = backups
            .iter()
            .map(|b| (b.filename.clone(), b.is_monthly))
            .collect();
        assert_eq!(
            flags,
            vec![
                ("backup-20250201-080000.json".to_string(), true),
                ("backup-20250105-080000-000.json".to_string(), false),
                ("backup-20250103-080000-000.json".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_retention_policy() {
        let (_temp, _storage, manager) = create_test_setup();
        let jan_first = fake_backup(&manager, "20250103-080000-000");
        fake_backup(&manager, "20250110-080000-000");
        fake_backup(&manager, "20250111-080000-000");
        let oldest_daily = fake_backup(&manager, "20250109-080000-000");
        fake_backup(&manager, "20250201-080000-000");

        let deleted = manager.enforce_retention().unwrap();

        assert_eq!(deleted.len(), 2);
        assert!(deleted.contains(&jan_first));
        assert!(deleted.contains(&oldest_daily));
        assert_eq!(manager.list_backups().unwrap().len(), 3);
    }

    #[test]
    fn test_get_backup_by_name_and_latest() {
        let (_temp, _storage, manager) = create_test_setup();
        fake_backup(&manager, "20250103-080000-000");
        fake_backup(&manager, "20250104-080000-000");

        let latest = manager.get_backup("latest").unwrap().unwrap();
        assert_eq!(latest.filename, "backup-20250104-080000-000.json");
        assert!(manager
            .get_backup("backup-20250103-080000-000")
            .unwrap()
            .is_some());
        assert!(manager.get_backup("backup-19990101-000000.json").unwrap().is_none());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let ts = parse_backup_timestamp("20250315-143022-250").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-15T14:30:22.250+00:00");
        assert!(parse_backup_timestamp("20250315-1430").is_none());
        assert!(parse_backup_timestamp("20251315-143022").is_none());
        assert!(parse_backup_timestamp("20250315-143022-1-2").is_none());
    }

    #[test]
    fn test_empty_backup_dir() {
        let (_temp, _storage, manager) = create_test_setup();
        assert!(manager.list_backups().unwrap().is_empty());
        assert!(manager.get_latest_backup().unwrap().is_none());
        assert!(manager.enforce_retention().unwrap().is_empty());
    }
}
