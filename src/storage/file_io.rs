//! File I/O utilities with atomic writes
//!
//! Every data file is replaced through a temp file and a rename, so a crash
//! mid-write leaves either the old or the new contents on disk.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::LedgerError;

fn open_reader(path: &Path) -> Result<BufReader<File>, LedgerError> {
    let file = File::open(path)
        .map_err(|e| LedgerError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, LedgerError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    serde_json::from_reader(open_reader(path)?)
        .map_err(|e| LedgerError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Read a whole file as UTF-8, refusing files larger than `max_bytes`
pub fn read_to_string_limited<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<String, LedgerError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(LedgerError::Storage(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let size = fs::metadata(path)
        .map_err(|e| LedgerError::Storage(format!("Failed to stat {}: {}", path.display(), e)))?
        .len();
    if size > max_bytes {
        return Err(LedgerError::Storage(format!(
            "File too large: {} is {} bytes (max {})",
            path.display(),
            size,
            max_bytes
        )));
    }

    let mut contents = String::with_capacity(size as usize);
    open_reader(path)?
        .read_to_string(&mut contents)
        .map_err(|e| LedgerError::Storage(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(contents)
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), LedgerError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic_with(path.as_ref(), |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| LedgerError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

/// Write arbitrary bytes produced by `fill` to `path` atomically
pub fn write_atomic_with<F>(path: &Path, fill: F) -> Result<(), LedgerError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), LedgerError>,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            LedgerError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file must live in the same directory for the rename to be atomic
    let temp_path = temp_path_for(path);

    let file = File::create(&temp_path)
        .map_err(|e| LedgerError::Storage(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    let written = fill(&mut writer)
        .and_then(|_| {
            writer
                .flush()
                .map_err(|e| LedgerError::Storage(format!("Failed to flush data: {}", e)))
        })
        .and_then(|_| {
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| LedgerError::Storage(format!("Failed to sync data: {}", e)))
        });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        LedgerError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Check if a JSON file exists and is valid
pub fn json_file_valid<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    match open_reader(path) {
        Ok(reader) => serde_json::from_reader::<_, serde_json::Value>(reader).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct TestData {
        name: String,
        value: i32,
    }

    fn sample() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_read_nonexistent_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: TestData = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(data, TestData::default());
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        write_json_atomic(&path, &sample()).unwrap();
        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_atomic_write_no_temp_file_left() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");

        write_json_atomic(&path, &sample()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("test.json.tmp").exists());
    }

    #[test]
    fn test_failed_fill_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.json");
        write_json_atomic(&path, &sample()).unwrap();

        let result = write_atomic_with(&path, |_| Err(LedgerError::Storage("boom".into())));
        assert!(result.is_err());

        let loaded: TestData = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
        assert!(!temp_dir.path().join("test.json.tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("test.json");

        write_json_atomic(&path, &sample()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_read_limited() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.json");
        fs::write(&path, "0123456789").unwrap();

        assert_eq!(read_to_string_limited(&path, 10).unwrap(), "0123456789");
        assert!(read_to_string_limited(&path, 9).is_err());
        assert!(read_to_string_limited(temp_dir.path().join("none"), 10).is_err());
    }

    #[test]
    fn test_json_file_valid() {
        let temp_dir = TempDir::new().unwrap();
        let valid_path = temp_dir.path().join("valid.json");
        let invalid_path = temp_dir.path().join("invalid.json");

        fs::write(&valid_path, r#"{"name": "test"}"#).unwrap();
        fs::write(&invalid_path, "not json at all").unwrap();

        assert!(json_file_valid(&valid_path));
        assert!(!json_file_valid(&invalid_path));
        assert!(!json_file_valid(temp_dir.path().join("nonexistent.json")));
    }
}
