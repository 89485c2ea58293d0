//! Application settings for LedgerNote
//!
//! Manages application behaviour: currency display, backup retention,
//! recurring-entry processing on start-up, and import limits. User-facing
//! preferences that travel with exports (theme, passcode) live in the
//! preference store instead.

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;

/// Default maximum size of a file accepted by `import` (50 MiB)
pub const DEFAULT_IMPORT_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
    /// Number of monthly backups to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// Application settings for LedgerNote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when displaying amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Generate due recurring entries every time the CLI starts
    #[serde(default = "default_true")]
    pub process_recurring_on_start: bool,

    /// Largest file `import` will read
    #[serde(default = "default_import_max_bytes")]
    pub import_max_bytes: u64,

    /// Whether mutations are appended to the audit log
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_true() -> bool {
    true
}

fn default_import_max_bytes() -> u64 {
    DEFAULT_IMPORT_MAX_BYTES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            backup_retention: BackupRetention::default(),
            process_recurring_on_start: true,
            import_max_bytes: DEFAULT_IMPORT_MAX_BYTES,
            audit_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                LedgerError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            LedgerError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            LedgerError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "$");
        assert!(settings.process_recurring_on_start);
        assert_eq!(settings.import_max_bytes, 50 * 1024 * 1024);
        assert_eq!(settings.backup_retention.daily_count, 30);
        assert_eq!(settings.backup_retention.monthly_count, 12);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.currency_symbol = "₱".to_string();
        settings.process_recurring_on_start = false;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.currency_symbol, "₱");
        assert!(!loaded.process_recurring_on_start);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "€"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "€");
        assert!(settings.audit_enabled);
        assert_eq!(settings.import_max_bytes, DEFAULT_IMPORT_MAX_BYTES);
    }
}
