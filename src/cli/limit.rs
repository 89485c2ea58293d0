//! Budget limit CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_limit_list, format_limit_status};
use crate::error::LedgerResult;
use crate::models::{Money, Month};
use crate::services::{CategoryService, LimitService};
use crate::storage::Storage;

use super::{category_titles, parse_money};

/// Budget limit subcommands
#[derive(Subcommand)]
pub enum LimitCommands {
    /// Set (or change) the monthly limit of a category
    Set {
        /// Category title or ID
        category: String,
        /// Limit amount, e.g. "400"
        #[arg(value_parser = parse_money)]
        amount: Money,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<Month>,
    },

    /// List limits with their spent totals
    #[command(alias = "ls")]
    List {
        /// Only this month
        #[arg(short, long)]
        month: Option<Month>,
        /// Only limits that are exceeded
        #[arg(long)]
        over: bool,
    },

    /// Stop tracking a limit without deleting it
    Deactivate {
        /// Limit ID
        limit: String,
    },

    /// Delete a limit
    #[command(alias = "rm")]
    Remove {
        /// Limit ID
        limit: String,
    },

    /// Recompute spent totals from the recorded expenses
    Recompute {
        /// Only this month (defaults to every month with a limit)
        #[arg(short, long)]
        month: Option<Month>,
    },
}

/// Handle a limit command
pub fn handle_limit_command(storage: &Storage, settings: &Settings, cmd: LimitCommands) -> LedgerResult<()> {
    let service = LimitService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        LimitCommands::Set {
            category,
            amount,
            month,
        } => {
            let category = CategoryService::new(storage).resolve(&category)?;
            let limit = service.set(category.id, month.unwrap_or_else(Month::current), amount)?;
            println!("{}", format_limit_status(&limit, &category.title, symbol));
        }

        LimitCommands::List { month, over } => {
            let limits = if over {
                service
                    .over_budget()?
                    .into_iter()
                    .filter(|l| month.map_or(true, |m| l.month == m))
                    .collect()
            } else {
                service.list(month)?
            };
            print!("{}", format_limit_list(&limits, &category_titles(storage)?, symbol));
        }

        LimitCommands::Deactivate { limit } => {
            let id = service.find(&limit)?.id;
            let limit = service.deactivate(id)?;
            println!("Deactivated limit {} for {}", limit.id, limit.month);
        }

        LimitCommands::Remove { limit } => {
            let id = service.find(&limit)?.id;
            let limit = service.remove(id)?;
            println!("Removed limit {} for {}", limit.id, limit.month);
        }

        LimitCommands::Recompute { month } => {
            let changed = match month {
                Some(month) => service.recompute(month)?,
                None => service.recompute_all()?,
            };
            println!("Recomputed limits; {} spent total(s) changed.", changed);
        }
    }

    Ok(())
}
