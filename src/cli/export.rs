//! CLI commands for data export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::error::{LedgerError, LedgerResult};
use crate::export::{export_full_json, export_full_yaml, export_month_csv, FullExport};
use crate::models::Month;
use crate::storage::Storage;

/// Full export format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON (also readable by import)
    Json,
    /// YAML, human-readable (also readable by import)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export all data to a file
    All {
        /// Output file path
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export one month of budget entries to CSV
    Csv {
        /// Output file path
        output: PathBuf,

        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<Month>,
    },

    /// Show what an export would contain
    Info,
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> LedgerResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Json => export_full_json(storage, &mut writer, pretty)?,
                ExportFormat::Yaml => export_full_yaml(storage, &mut writer)?,
            }
            finish(writer)?;
            println!("Full data set exported to: {}", output.display());
        }

        ExportCommands::Csv { output, month } => {
            let month = month.unwrap_or_else(Month::current);
            let mut writer = create_output(&output)?;
            let count = export_month_csv(storage, month, &mut writer)?;
            finish(writer)?;
            println!("Exported {} entries for {} to: {}", count, month, output.display());
        }

        ExportCommands::Info => handle_export_info(storage)?,
    }

    Ok(())
}

fn create_output(output: &Path) -> LedgerResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        LedgerError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

fn finish(mut writer: BufWriter<File>) -> LedgerResult<()> {
    writer
        .flush()
        .map_err(|e| LedgerError::Export(format!("Failed to write export: {}", e)))
}

fn handle_export_info(storage: &Storage) -> LedgerResult<()> {
    let export = FullExport::from_storage(storage)?;

    println!("Export Information");
    println!("==================\n");

    println!("Schema Version: {}", export.schema_version);
    println!("App Version:    {}", export.app_version);
    println!();

    println!("Data Summary:");
    println!("  Notes:       {}", export.metadata.note_count);
    println!("  Categories:  {}", export.metadata.category_count);
    println!("  Entries:     {}", export.metadata.entry_count);
    println!("  Limits:      {}", export.metadata.limit_count);
    println!("  Archived:    {}", export.metadata.archive_count);
    println!("  Preferences: {}", export.preferences.len());

    if let (Some(earliest), Some(latest)) =
        (&export.metadata.earliest_entry, &export.metadata.latest_entry)
    {
        println!();
        println!("Entry Date Range: {} to {}", earliest, latest);
    }

    Ok(())
}
