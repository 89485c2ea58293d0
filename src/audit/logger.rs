//! Append-only JSONL audit log

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};

use super::entry::AuditEntry;

/// Writes audit entries to `audit.log`, one JSON object per line
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append one entry and flush
    pub fn log(&self, entry: &AuditEntry) -> LedgerResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// Append several entries with a single flush
    pub fn log_batch(&self, entries: &[AuditEntry]) -> LedgerResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;
        let mut writer = BufWriter::new(file);

        for entry in entries {
            let line = serde_json::to_string(entry)
                .map_err(|e| LedgerError::Json(format!("Failed to serialize audit entry: {}", e)))?;
            writeln!(writer, "{}", line)
                .map_err(|e| LedgerError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        writer
            .flush()
            .map_err(|e| LedgerError::Io(format!("Failed to flush audit log: {}", e)))
    }

    /// All entries, oldest first
    pub fn read_all(&self) -> LedgerResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                LedgerError::Io(format!("Failed to read audit log line {}: {}", idx + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }

            let entry = serde_json::from_str(&line).map_err(|e| {
                LedgerError::Json(format!("Failed to parse audit entry at line {}: {}", idx + 1, e))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// The last `count` entries, oldest first
    pub fn read_recent(&self, count: usize) -> LedgerResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }

    pub fn entry_count(&self) -> LedgerResult<usize> {
        if !self.log_path.exists() {
            return Ok(0);
        }

        let file = File::open(&self.log_path)
            .map_err(|e| LedgerError::Io(format!("Failed to open audit log: {}", e)))?;
        Ok(BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count())
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }
}
