//! Archive CLI commands

use chrono::Utc;
use clap::Subcommand;

use crate::display::format_archive_list;
use crate::error::LedgerResult;
use crate::models::ArchiveKind;
use crate::services::ArchiveService;
use crate::storage::Storage;

/// Archive subcommands
#[derive(Subcommand)]
pub enum ArchiveCommands {
    /// List archived records, most recently deleted first
    #[command(alias = "ls")]
    List {
        /// note or budget
        #[arg(short, long)]
        kind: Option<ArchiveKind>,
    },

    /// Restore an archived record
    Restore {
        /// Archive ID (omit with --latest)
        #[arg(required_unless_present = "latest")]
        archive: Option<String>,
        /// Restore the most recent deletion
        #[arg(long, conflicts_with = "archive")]
        latest: bool,
    },

    /// Permanently delete archived records
    Purge {
        /// Archive ID
        #[arg(required_unless_present_any = ["all", "older_than"])]
        archive: Option<String>,
        /// Purge everything (optionally only one --kind)
        #[arg(long, conflicts_with_all = ["archive", "older_than"])]
        all: bool,
        /// Purge records deleted more than this many days ago
        #[arg(long, conflicts_with = "archive")]
        older_than: Option<u32>,
        #[arg(short, long, requires = "all")]
        kind: Option<ArchiveKind>,
    },
}

/// Handle an archive command
pub fn handle_archive_command(storage: &Storage, cmd: ArchiveCommands) -> LedgerResult<()> {
    let service = ArchiveService::new(storage);

    match cmd {
        ArchiveCommands::List { kind } => {
            print!("{}", format_archive_list(&service.list(kind)?));
        }

        ArchiveCommands::Restore { archive, latest } => {
            let restored = match archive {
                Some(identifier) if !latest => {
                    let id = service.find(&identifier)?.id;
                    service.restore(id)?
                }
                _ => service.restore_latest()?,
            };
            println!("Restored {}", restored.describe());
        }

        ArchiveCommands::Purge {
            archive,
            all,
            older_than,
            kind,
        } => {
            let purged = if all {
                service.purge_all(kind)?
            } else if let Some(days) = older_than {
                service.purge_older_than(days, Utc::now())?
            } else if let Some(identifier) = archive {
                let id = service.find(&identifier)?.id;
                service.purge(id)?;
                1
            } else {
                0
            };
            println!("Permanently deleted {} archived record(s).", purged);
        }
    }

    Ok(())
}
