use anyhow::Result;
use chrono::Local;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ledgernote::cli::{
    handle_archive_command, handle_audit_command, handle_backup_command, handle_budget_command,
    handle_category_command, handle_export_command, handle_import_command, handle_limit_command,
    handle_note_command, handle_passcode_command, handle_theme_command, unlock,
};
use ledgernote::config::{paths::LedgerPaths, settings::Settings};
use ledgernote::services::RecurrenceService;
use ledgernote::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "ledgernote",
    version,
    about = "Terminal notes and budget tracker",
    long_about = "LedgerNote keeps notes and a simple income/expense budget in one place. \
                  Deleted notes and entries go to an archive and can be restored; \
                  recurring entries are generated on schedule."
)]
struct Cli {
    /// Passcode for locked data (prompted for when omitted)
    #[arg(long, global = true, env = "LEDGERNOTE_PASSCODE", hide_env_values = true)]
    passcode: Option<String>,

    /// More diagnostic output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default category
    Init,

    /// Show current configuration and paths
    Config,

    /// Notes
    #[command(subcommand)]
    Note(ledgernote::cli::NoteCommands),

    /// Note categories
    #[command(subcommand, alias = "cat")]
    Category(ledgernote::cli::CategoryCommands),

    /// Income and expense entries
    #[command(subcommand)]
    Budget(ledgernote::cli::BudgetCommands),

    /// Monthly spending limits per category
    #[command(subcommand)]
    Limit(ledgernote::cli::LimitCommands),

    /// Deleted notes and entries
    #[command(subcommand)]
    Archive(ledgernote::cli::ArchiveCommands),

    /// The 4-digit passcode
    #[command(subcommand)]
    Passcode(ledgernote::cli::PasscodeCommands),

    /// Export data
    #[command(subcommand)]
    Export(ledgernote::cli::ExportCommands),

    /// Merge a JSON or YAML export into the current data
    Import {
        /// Export file (.json, .yaml or .yml)
        file: std::path::PathBuf,
    },

    /// Backups
    #[command(subcommand)]
    Backup(ledgernote::cli::BackupCommands),

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },

    /// Display theme preference
    #[command(subcommand)]
    Theme(ledgernote::cli::ThemeCommands),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("LEDGERNOTE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("ledgernote={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    debug!(base = %paths.base_dir().display(), "starting ledgernote v{}", env!("CARGO_PKG_VERSION"));

    let command = match cli.command {
        Some(Commands::Init) => {
            println!("Initializing LedgerNote at: {}", paths.base_dir().display());
            let created = initialize_storage(&paths)?;
            settings.save(&paths)?;
            if created {
                println!("Created the default category 'Budget'.");
            }
            println!("Initialization complete!");
            println!();
            println!("Run 'ledgernote note add <title>' to write your first note.");
            return Ok(());
        }
        Some(Commands::Config) => {
            println!("LedgerNote Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Audit log:        {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:       {}", settings.currency_symbol);
            println!("  Recurring on start:    {}", settings.process_recurring_on_start);
            println!("  Audit log enabled:     {}", settings.audit_enabled);
            println!("  Import size limit:     {} bytes", settings.import_max_bytes);
            println!(
                "  Backup retention:      {} daily, {} monthly",
                settings.backup_retention.daily_count, settings.backup_retention.monthly_count
            );
            return Ok(());
        }
        Some(command) => command,
        None => {
            println!("LedgerNote - notes and budget tracking in the terminal");
            println!();
            println!("Run 'ledgernote --help' for usage information.");
            return Ok(());
        }
    };

    initialize_storage(&paths)?;
    let mut storage = Storage::new(paths)?;
    storage.set_audit_enabled(settings.audit_enabled);
    storage.load_all()?;

    let current_passcode = unlock(&storage, cli.passcode)?;

    if settings.process_recurring_on_start {
        let run = RecurrenceService::new(&storage).process_due(Local::now().date_naive())?;
        if !run.generated.is_empty() {
            info!(count = run.generated.len(), "generated due recurring entries");
        }
    }

    match command {
        Commands::Note(cmd) => handle_note_command(&storage, &settings, cmd)?,
        Commands::Category(cmd) => handle_category_command(&storage, cmd)?,
        Commands::Budget(cmd) => handle_budget_command(&storage, &settings, cmd)?,
        Commands::Limit(cmd) => handle_limit_command(&storage, &settings, cmd)?,
        Commands::Archive(cmd) => handle_archive_command(&storage, cmd)?,
        Commands::Passcode(cmd) => {
            handle_passcode_command(&storage, current_passcode.as_deref().map(String::as_str), cmd)?
        }
        Commands::Export(cmd) => handle_export_command(&storage, cmd)?,
        Commands::Import { file } => handle_import_command(&storage, &settings, &file)?,
        Commands::Backup(cmd) => handle_backup_command(&storage, &settings, cmd)?,
        Commands::Audit { limit } => handle_audit_command(&storage, limit)?,
        Commands::Theme(cmd) => handle_theme_command(&storage, cmd)?,
        Commands::Init | Commands::Config => {}
    }

    Ok(())
}
