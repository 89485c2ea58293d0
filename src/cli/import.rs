//! CLI handler for merging a full export back in

use std::path::Path;

use crate::config::settings::Settings;
use crate::error::LedgerResult;
use crate::services::{ImportResult, ImportService};
use crate::storage::Storage;

/// Handle the import command
pub fn handle_import_command(storage: &Storage, settings: &Settings, file: &Path) -> LedgerResult<()> {
    let result = ImportService::new(storage).import_file(file, settings.import_max_bytes)?;
    print!("{}", format_import_result(&result));
    Ok(())
}

/// Per-kind import counts
pub fn format_import_result(result: &ImportResult) -> String {
    let mut output = String::new();
    output.push_str("Import complete\n");
    output.push_str(&format!("  Categories:  {}\n", result.categories));
    output.push_str(&format!("  Notes:       {}\n", result.notes));
    output.push_str(&format!("  Entries:     {}\n", result.entries));
    output.push_str(&format!("  Limits:      {}\n", result.limits));
    output.push_str(&format!("  Archived:    {}\n", result.archives));
    output.push_str(&format!("  Preferences: {}\n", result.preferences));
    if result.notes_moved_to_default > 0 {
        output.push_str(&format!(
            "{} note(s) had an unknown category and were filed under the default category.\n",
            result.notes_moved_to_default
        ));
    }
    output
}
