//! Backup CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::settings::Settings;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::Storage;

use super::import::format_import_result;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup and prune old ones
    Create,

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Merge a backup back into the current data
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,
    },

    /// Show what a backup contains
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete old backups according to the retention policy
    Prune {
        /// Skip the dry run and delete
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(storage: &Storage, settings: &Settings, cmd: BackupCommands) -> LedgerResult<()> {
    let manager = BackupManager::new(storage.paths(), settings.backup_retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (backup_path, pruned) = manager.create_backup_with_retention(storage)?;
            println!("Backup created: {}", backup_path.display());
            if !pruned.is_empty() {
                println!("Pruned {} old backup(s).", pruned.len());
            }
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: ledgernote backup create");
                return Ok(());
            }

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let monthly_marker = if backup.is_monthly { " [monthly]" } else { "" };

                if verbose {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        monthly_marker,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                        monthly_marker,
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let restore = RestoreManager::new(storage, settings.import_max_bytes);
            let result = restore.restore_from_file(&backup_path)?;
            println!("Restored from {}", backup_path.display());
            print!("{}", format_import_result(&result));
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let validation =
                RestoreManager::new(storage, settings.import_max_bytes).validate_backup(&backup_path)?;
            println!("File: {}", backup_path.display());
            println!("{}", validation.summary());
            if validation.has_passcode {
                println!("Contains a passcode (never overwrites an existing one).");
            }
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let retention = &settings.backup_retention;
            let (monthly, daily): (Vec<_>, Vec<_>) = backups.iter().partition(|b| b.is_monthly);

            let daily_to_delete = daily.len().saturating_sub(retention.daily_count as usize);
            let monthly_to_delete = monthly
                .len()
                .saturating_sub(retention.monthly_count as usize);

            println!(
                "Retention policy: {} daily, {} monthly",
                retention.daily_count, retention.monthly_count
            );
            if daily_to_delete + monthly_to_delete == 0 {
                println!("No backups to prune.");
                return Ok(());
            }

            if !force {
                println!(
                    "Would delete {} daily and {} monthly backup(s). Run again with --force.",
                    daily_to_delete, monthly_to_delete
                );
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Resolve `latest`, a backup file name, or a path
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> LedgerResult<PathBuf> {
    if let Some(info) = manager.get_backup(backup)? {
        return Ok(info.path);
    }

    let path = PathBuf::from(backup);
    if path.is_file() {
        return Ok(path);
    }

    Err(LedgerError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    })
}

fn format_duration(duration: chrono::Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 1 {
        return format!("{}s", duration.num_seconds().max(0));
    }
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    if days < 30 {
        format!("{}d", days)
    } else {
        format!("{}mo", days / 30)
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
