//! Category CLI commands

use clap::Subcommand;

use crate::display::{format_category_details, format_category_list};
use crate::error::LedgerResult;
use crate::services::{CategoryService, CategoryUpdate};
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories with their note counts
    List,

    /// Create a category
    Create {
        /// Category title (unique, case-insensitive)
        title: String,
        /// Display color, e.g. "#FF6200EE"
        #[arg(long)]
        color: Option<String>,
        /// Display icon name
        #[arg(long)]
        icon: Option<String>,
    },

    /// Show category details
    Show {
        /// Category title or ID
        category: String,
    },

    /// Rename or restyle a category
    Edit {
        /// Category title or ID
        category: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New color (empty string clears it)
        #[arg(long)]
        color: Option<String>,
        /// New icon (empty string clears it)
        #[arg(long)]
        icon: Option<String>,
    },

    /// Set the display order; unlisted categories keep their relative order after these
    Reorder {
        /// Category titles or IDs, in the new order
        #[arg(required = true)]
        categories: Vec<String>,
    },

    /// Delete a category (must have no notes; its limits go with it)
    Delete {
        /// Category title or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> LedgerResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let rows = service
                .list()?
                .into_iter()
                .map(|c| {
                    let count = service.note_count(c.id)?;
                    Ok((c, count))
                })
                .collect::<LedgerResult<Vec<_>>>()?;
            print!("{}", format_category_list(&rows));
        }

        CategoryCommands::Create { title, color, icon } => {
            let category = service.create(&title, color.as_deref(), icon.as_deref())?;
            println!("Created category: {}", category.title);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Show { category } => {
            let category = service.resolve(&category)?;
            let count = service.note_count(category.id)?;
            print!("{}", format_category_details(&category, count));
        }

        CategoryCommands::Edit {
            category,
            title,
            color,
            icon,
        } => {
            let id = service.resolve(&category)?.id;
            let updated = service.update(
                id,
                CategoryUpdate {
                    title: title.as_deref(),
                    color: color.as_deref(),
                    icon: icon.as_deref(),
                },
            )?;
            println!("Updated category: {}", updated.title);
        }

        CategoryCommands::Reorder { categories } => {
            let ids = categories
                .iter()
                .map(|c| service.resolve(c).map(|cat| cat.id))
                .collect::<LedgerResult<Vec<_>>>()?;
            let ordered = service.reorder(&ids)?;
            println!("New order:");
            for (i, category) in ordered.iter().enumerate() {
                println!("  {}. {}", i + 1, category.title);
            }
        }

        CategoryCommands::Delete { category } => {
            let id = service.resolve(&category)?.id;
            let deleted = service.delete(id)?;
            println!("Deleted category: {}", deleted.title);
        }
    }

    Ok(())
}
