//! CLI command handlers
//!
//! Bridges the clap argument parsing with the service layer.

pub mod archive;
pub mod audit;
pub mod backup;
pub mod budget;
pub mod category;
pub mod export;
pub mod import;
pub mod limit;
pub mod note;
pub mod passcode;
pub mod theme;

use std::collections::HashMap;

use crate::error::LedgerResult;
use crate::models::{CategoryId, Money};
use crate::storage::Storage;

pub use archive::{handle_archive_command, ArchiveCommands};
pub use audit::handle_audit_command;
pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use export::{handle_export_command, ExportCommands};
pub use import::handle_import_command;
pub use limit::{handle_limit_command, LimitCommands};
pub use note::{handle_note_command, NoteCommands};
pub use passcode::{handle_passcode_command, unlock, PasscodeCommands};
pub use theme::{handle_theme_command, ThemeCommands};

/// clap value parser for amounts
pub(crate) fn parse_money(s: &str) -> Result<Money, String> {
    Money::parse(s).map_err(|e| e.to_string())
}

/// Category titles by id, for table output
pub(crate) fn category_titles(storage: &Storage) -> LedgerResult<HashMap<CategoryId, String>> {
    Ok(storage
        .categories
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.title))
        .collect())
}
