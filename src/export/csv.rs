//! CSV export of one month of budget entries

use std::io::Write;

use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryType, Month};
use crate::storage::Storage;

pub const CSV_HEADER: [&str; 5] = ["Date", "Description", "Type", "Subcategory", "Amount"];

/// Write the entries of `month`, oldest first; returns the number of rows
pub fn export_month_csv<W: Write>(storage: &Storage, month: Month, writer: W) -> LedgerResult<usize> {
    let mut entries = storage.entries.get_by_month(month)?;
    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut csv = ::csv::Writer::from_writer(writer);
    let to_err = |e: ::csv::Error| LedgerError::Export(e.to_string());

    csv.write_record(CSV_HEADER).map_err(to_err)?;
    for entry in &entries {
        csv.write_record([
            entry.date.to_string(),
            entry.description.clone(),
            match entry.entry_type {
                EntryType::Income => "Income".to_string(),
                EntryType::Expense => "Expense".to_string(),
            },
            entry.sub_category.clone().unwrap_or_default(),
            format!("{:.2}", entry.amount.as_f64()),
        ])
        .map_err(to_err)?;
    }
    csv.flush().map_err(|e| LedgerError::Export(e.to_string()))?;

    Ok(entries.len())
}
