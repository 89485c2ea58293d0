//! Theme CLI commands

use clap::Subcommand;

use crate::error::LedgerResult;
use crate::services::{Theme, ThemeService};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum ThemeCommands {
    /// Show the current theme
    Show,
    /// Set the theme: light, dark or system
    Set { theme: Theme },
}

pub fn handle_theme_command(storage: &Storage, cmd: ThemeCommands) -> LedgerResult<()> {
    let service = ThemeService::new(storage);

    match cmd {
        ThemeCommands::Show => println!("Theme: {}", service.get()?),
        ThemeCommands::Set { theme } => {
            service.set(theme)?;
            println!("Theme set to {}", theme);
        }
    }

    Ok(())
}
