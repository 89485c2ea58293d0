//! Note CLI commands

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_archive_list, format_note_details, format_note_line, format_note_list};
use crate::error::LedgerResult;
use crate::services::{CategoryService, NewNote, NoteFilter, NoteService, NoteUpdate};
use crate::storage::Storage;

use super::category_titles;

/// Note subcommands
#[derive(Subcommand)]
pub enum NoteCommands {
    /// Create a note
    #[command(alias = "new")]
    Add {
        /// Note title
        title: String,
        /// Note text
        #[arg(short, long, default_value = "")]
        content: String,
        /// Category title or ID (defaults to the default category)
        #[arg(short = 'g', long)]
        category: Option<String>,
        /// Mark as a budget note
        #[arg(short, long)]
        budget: bool,
        /// Path of a voice recording to attach
        #[arg(long)]
        voice: Option<PathBuf>,
    },

    /// List notes (pinned first, then newest)
    #[command(alias = "ls")]
    List {
        /// Only notes in this category
        #[arg(short = 'g', long)]
        category: Option<String>,
        /// Case-insensitive text search over title and content
        #[arg(short, long)]
        search: Option<String>,
        /// Only budget notes
        #[arg(short, long)]
        budget: bool,
    },

    /// Show a note
    Show {
        /// Note ID or title
        note: String,
    },

    /// Edit a note
    Edit {
        /// Note ID or title
        note: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        /// Move to another category
        #[arg(short = 'g', long)]
        category: Option<String>,
        /// Set or clear the budget flag
        #[arg(long)]
        budget: Option<bool>,
    },

    /// Attach a voice recording path to a note
    AttachVoice {
        note: String,
        path: PathBuf,
    },

    /// Remove the voice recording path from a note
    DetachVoice {
        note: String,
    },

    /// Pin or unpin a note
    Pin {
        note: String,
    },

    /// Delete notes (they go to the archive with their entries)
    #[command(alias = "rm")]
    Delete {
        /// Note IDs or titles
        #[arg(required = true)]
        notes: Vec<String>,
    },
}

/// Handle a note command
pub fn handle_note_command(storage: &Storage, settings: &Settings, cmd: NoteCommands) -> LedgerResult<()> {
    let service = NoteService::new(storage);
    let categories = CategoryService::new(storage);

    match cmd {
        NoteCommands::Add {
            title,
            content,
            category,
            budget,
            voice,
        } => {
            let category_id = match category {
                Some(c) => Some(categories.resolve(&c)?.id),
                None => None,
            };
            let note = service.create(NewNote {
                title,
                content,
                category_id,
                is_budget: budget,
                voice_path: voice,
            })?;
            println!("Created note: {}", format_note_line(&note));
        }

        NoteCommands::List {
            category,
            search,
            budget,
        } => {
            let category_id = match category {
                Some(c) => Some(categories.resolve(&c)?.id),
                None => None,
            };
            let notes = service.list(&NoteFilter {
                category_id,
                search,
                budget_only: budget,
            })?;
            print!("{}", format_note_list(&notes, &category_titles(storage)?));
            if !notes.is_empty() {
                println!("Flags: P pinned, $ budget note, ♪ voice attached");
            }
        }

        NoteCommands::Show { note } => {
            let note = service.find(&note)?;
            let category = categories.get(note.category_id)?;
            let entries = storage.entries.get_by_note(note.id)?;
            print!(
                "{}",
                format_note_details(
                    &note,
                    category.as_ref().map(|c| c.title.as_str()),
                    &entries,
                    &settings.currency_symbol
                )
            );
        }

        NoteCommands::Edit {
            note,
            title,
            content,
            category,
            budget,
        } => {
            let id = service.find(&note)?.id;
            let category_id = match category {
                Some(c) => Some(categories.resolve(&c)?.id),
                None => None,
            };
            let updated = service.update(
                id,
                NoteUpdate {
                    title,
                    content,
                    category_id,
                    is_budget: budget,
                },
            )?;
            println!("Updated note: {}", format_note_line(&updated));
        }

        NoteCommands::AttachVoice { note, path } => {
            let id = service.find(&note)?.id;
            let updated = service.attach_voice(id, path)?;
            if let Some(path) = &updated.voice_path {
                println!("Attached {} to '{}'", path.display(), updated.title);
            }
        }

        NoteCommands::DetachVoice { note } => {
            let id = service.find(&note)?.id;
            let updated = service.detach_voice(id)?;
            println!("Removed voice attachment from '{}'", updated.title);
        }

        NoteCommands::Pin { note } => {
            let id = service.find(&note)?.id;
            let updated = service.toggle_pin(id)?;
            if updated.is_pinned {
                println!("Pinned '{}'", updated.title);
            } else {
                println!("Unpinned '{}'", updated.title);
            }
        }

        NoteCommands::Delete { notes } => {
            let ids = notes
                .iter()
                .map(|n| service.find(n).map(|note| note.id))
                .collect::<LedgerResult<Vec<_>>>()?;
            let archives = service.delete_many(&ids)?;
            println!("Archived {} note(s):", archives.len());
            print!("{}", format_archive_list(&archives));
            println!("\nUse 'ledgernote archive restore <id>' to bring one back.");
        }
    }

    Ok(())
}
