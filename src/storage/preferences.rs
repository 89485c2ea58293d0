//! Key/value preference store
//!
//! User-facing preferences (theme, passcode hash) live in preferences.json
//! and travel with full exports.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

pub const THEME_KEY: &str = "theme";
pub const PASSCODE_KEY: &str = "passcode";

/// Repository for string preferences
pub struct PreferenceRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl PreferenceRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: BTreeMap<String, String> = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_err)?;
        *data = file_data;
        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        write_json_atomic(&self.path, &*data)
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(key).cloned())
    }

    pub fn contains(&self, key: &str) -> Result<bool, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.contains_key(key))
    }

    /// Set a value, returning the previous one
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Result<Option<String>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.insert(key.into(), value.into()))
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(key))
    }

    /// Snapshot of every preference
    pub fn all(&self) -> Result<BTreeMap<String, String>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove_persist() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");
        let repo = PreferenceRepository::new(path.clone());
        repo.load().unwrap();

        assert!(repo.get(THEME_KEY).unwrap().is_none());
        assert!(repo.set(THEME_KEY, "dark").unwrap().is_none());
        assert_eq!(repo.set(THEME_KEY, "light").unwrap().as_deref(), Some("dark"));
        repo.set("scratch", "1").unwrap();
        repo.remove("scratch").unwrap();
        repo.save().unwrap();

        let reloaded = PreferenceRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert!(!reloaded.contains("scratch").unwrap());
    }
}
