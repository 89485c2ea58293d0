//! Budget entry CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{
    format_breakdown, format_entry_details, format_entry_list, format_entry_row,
    format_monthly_summary, format_recurrence_run, format_trend,
};
use crate::error::LedgerResult;
use crate::models::{EntryType, Frequency, Money, Month};
use crate::services::{BudgetService, EntryUpdate, NewEntry, NoteService, RecurrenceService};
use crate::storage::Storage;

use super::parse_money;

/// Budget entry subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Record an income or expense against a note
    Add {
        /// Note ID or title (flagged as a budget note if it is not one yet)
        note: String,
        /// What the money was for
        description: String,
        /// Amount, e.g. "12.50"
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        entry_type: EntryType,
        /// Entry date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Sub-category label, e.g. "Groceries"
        #[arg(short, long = "sub")]
        sub_category: Option<String>,
        /// Repeat weekly, monthly or yearly from the entry date
        #[arg(short, long)]
        repeat: Option<Frequency>,
        /// Last date a repetition may fall on
        #[arg(long, requires = "repeat")]
        until: Option<NaiveDate>,
    },

    /// List entries
    #[command(alias = "ls")]
    List {
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long, conflicts_with_all = ["note", "templates"])]
        month: Option<Month>,
        /// Only entries of this note
        #[arg(short, long)]
        note: Option<String>,
        /// Only income or only expense
        #[arg(short = 't', long = "type")]
        entry_type: Option<EntryType>,
        /// Only recurring templates
        #[arg(long)]
        templates: bool,
    },

    /// Show entry details
    Show {
        /// Entry ID
        entry: String,
    },

    /// Edit an entry (a new date on a template restarts its schedule there)
    Edit {
        entry: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long, value_parser = parse_money)]
        amount: Option<Money>,
        #[arg(short = 't', long = "type")]
        entry_type: Option<EntryType>,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// New sub-category (empty string clears it)
        #[arg(short, long = "sub")]
        sub_category: Option<String>,
    },

    /// Stop a recurring template from generating further entries
    StopRepeat {
        entry: String,
    },

    /// Delete an entry (it goes to the archive)
    #[command(alias = "rm")]
    Delete {
        entry: String,
    },

    /// Income, expense and balance for a month
    Summary {
        #[arg(short, long)]
        month: Option<Month>,
    },

    /// Expenses by sub-category for a month
    Breakdown {
        #[arg(short, long)]
        month: Option<Month>,
    },

    /// Sub-categories used in a month
    SubCategories {
        #[arg(short, long)]
        month: Option<Month>,
    },

    /// Monthly totals for the last few months
    Trend {
        /// Number of months to show (1-120)
        #[arg(short = 'n', long, default_value = "6", value_parser = clap::value_parser!(u16).range(1..=120))]
        months: u16,
        /// Last month shown (defaults to the current month)
        #[arg(short, long)]
        end: Option<Month>,
    },

    /// Generate recurring entries that are due
    ProcessRecurring {
        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(storage: &Storage, settings: &Settings, cmd: BudgetCommands) -> LedgerResult<()> {
    let service = BudgetService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Add {
            note,
            description,
            amount,
            entry_type,
            date,
            sub_category,
            repeat,
            until,
        } => {
            let note = NoteService::new(storage).find(&note)?;
            let entry = service.add(NewEntry {
                date,
                sub_category,
                frequency: repeat,
                ends_on: until,
                ..NewEntry::new(note.id, description, amount, entry_type)
            })?;
            println!("Added to '{}':", note.title);
            println!("{}", format_entry_row(&entry, symbol));
            if let Some(rec) = &entry.recurrence {
                println!("Repeats {}, next on {}", rec.frequency, rec.next_date);
            }
        }

        BudgetCommands::List {
            month,
            note,
            entry_type,
            templates,
        } => {
            let entries = if templates {
                service.list_templates()?
            } else if let Some(note) = note {
                let note = NoteService::new(storage).find(&note)?;
                service.list_by_note(note.id)?
            } else {
                let month = month.unwrap_or_else(Month::current);
                println!("{}", month.long_name());
                service.list_by_month(month, None)?
            };
            let entries: Vec<_> = entries
                .into_iter()
                .filter(|e| entry_type.map_or(true, |t| e.entry_type == t))
                .collect();
            print!("{}", format_entry_list(&entries, symbol));
        }

        BudgetCommands::Show { entry } => {
            let entry = service.find(&entry)?;
            let note = storage.notes.get(entry.note_id)?;
            print!(
                "{}",
                format_entry_details(&entry, note.as_ref().map(|n| n.title.as_str()), symbol)
            );
        }

        BudgetCommands::Edit {
            entry,
            description,
            amount,
            entry_type,
            date,
            sub_category,
        } => {
            let id = service.find(&entry)?.id;
            let updated = service.update(
                id,
                EntryUpdate {
                    description,
                    amount,
                    entry_type,
                    date,
                    sub_category,
                },
            )?;
            println!("Updated: {}", format_entry_row(&updated, symbol));
        }

        BudgetCommands::StopRepeat { entry } => {
            let id = service.find(&entry)?.id;
            let updated = service.stop_recurrence(id)?;
            println!("'{}' no longer repeats.", updated.description);
        }

        BudgetCommands::Delete { entry } => {
            let id = service.find(&entry)?.id;
            let archive = service.delete(id)?;
            println!("Archived {} ({})", archive.label(), archive.id);
        }

        BudgetCommands::Summary { month } => {
            let summary = service.monthly_summary(month.unwrap_or_else(Month::current))?;
            print!("{}", format_monthly_summary(&summary, symbol));
        }

        BudgetCommands::Breakdown { month } => {
            let month = month.unwrap_or_else(Month::current);
            println!("Expenses, {}", month.long_name());
            print!("{}", format_breakdown(&service.expense_breakdown(month)?, symbol));
        }

        BudgetCommands::SubCategories { month } => {
            let names = service.sub_categories(month.unwrap_or_else(Month::current))?;
            if names.is_empty() {
                println!("No sub-categories used.");
            }
            for name in names {
                println!("{}", name);
            }
        }

        BudgetCommands::Trend { months, end } => {
            let summaries = service.trend(end.unwrap_or_else(Month::current), usize::from(months))?;
            print!("{}", format_trend(&summaries, symbol));
        }

        BudgetCommands::ProcessRecurring { today } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            let run = RecurrenceService::new(storage).process_due(today)?;
            print!("{}", format_recurrence_run(&run, symbol));
        }
    }

    Ok(())
}
