//! Export module for LedgerNote
//!
//! - JSON: full data set with schema versioning (also the backup format)
//! - YAML: the same structure, human-readable
//! - CSV: one month of budget entries for spreadsheets

pub mod csv;
pub mod json;
pub mod yaml;

use std::path::Path;

use crate::error::LedgerResult;
use crate::storage::read_to_string_limited;

pub use self::csv::{export_month_csv, CSV_HEADER};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};

/// Read a full export from disk, YAML for `.yaml`/`.yml` files and JSON otherwise
///
/// Files larger than `max_bytes` are refused before parsing.
pub fn read_export_file(path: &Path, max_bytes: u64) -> LedgerResult<FullExport> {
    let contents = read_to_string_limited(path, max_bytes)
        .map_err(|e| crate::error::LedgerError::Import(e.to_string()))?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        import_from_yaml(&contents)
    } else {
        import_from_json(&contents)
    }
}
