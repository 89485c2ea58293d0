//! Path management for LedgerNote
//!
//! Provides XDG-compliant path resolution for configuration, data, and backups.
//!
//! ## Path Resolution Order
//!
//! 1. `LEDGERNOTE_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/ledgernote` or `~/.config/ledgernote`
//! 3. Windows: `%APPDATA%\ledgernote`

use std::path::PathBuf;

use crate::error::LedgerError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "LEDGERNOTE_DATA_DIR";

/// Manages all paths used by LedgerNote
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Create a new LedgerPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, LedgerError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create LedgerPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/ledgernote/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory (~/.config/ledgernote/backups/)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the default export directory (~/.config/ledgernote/exports/)
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn notes_file(&self) -> PathBuf {
        self.data_dir().join("notes.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    /// Get the path to entries.json (income/expense entries)
    pub fn entries_file(&self) -> PathBuf {
        self.data_dir().join("entries.json")
    }

    /// Get the path to limits.json (per-category monthly limits)
    pub fn limits_file(&self) -> PathBuf {
        self.data_dir().join("limits.json")
    }

    /// Get the path to archives.json (snapshots of deleted records)
    pub fn archives_file(&self) -> PathBuf {
        self.data_dir().join("archives.json")
    }

    /// Get the path to preferences.json (theme, passcode hash)
    pub fn preferences_file(&self) -> PathBuf {
        self.data_dir().join("preferences.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), LedgerError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| LedgerError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| LedgerError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| LedgerError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }

    /// Check if LedgerNote has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, LedgerError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) => PathBuf::from(xdg),
        Err(_) => {
            let home = std::env::var("HOME").map_err(|_| {
                LedgerError::Config("HOME environment variable not set".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("ledgernote"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, LedgerError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| LedgerError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("ledgernote"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.entries_file(),
            temp_dir.path().join("data").join("entries.json")
        );
        assert_eq!(
            paths.archives_file(),
            temp_dir.path().join("data").join("archives.json")
        );
    }
}
