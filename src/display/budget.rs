//! Budget entry and summary formatting

use crate::models::{BudgetEntry, EntryType};
use crate::services::{BreakdownRow, MonthlySummary, RecurrenceRun};

use super::text::{format_bar, format_percentage, money, separator, truncate};

fn marker(entry: &BudgetEntry) -> &'static str {
    if entry.is_template() {
        "↻"
    } else if entry.generated_from.is_some() {
        "·"
    } else {
        " "
    }
}

/// Format a single entry as a register row
pub fn format_entry_row(entry: &BudgetEntry, symbol: &str) -> String {
    let amount = match entry.entry_type {
        EntryType::Income => format!("+{}", money(entry.amount, symbol)),
        EntryType::Expense => format!("-{}", money(entry.amount, symbol)),
    };

    format!(
        "{} {} {:<12} {:24} {:14} {:>12}",
        marker(entry),
        entry.date.format("%Y-%m-%d"),
        entry.id.to_string(),
        truncate(&entry.description, 24),
        truncate(entry.sub_category.as_deref().unwrap_or(""), 14),
        amount
    )
}

/// Format entries as a register
pub fn format_entry_list(entries: &[BudgetEntry], symbol: &str) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "  {:10} {:<12} {:24} {:14} {:>12}\n",
        "Date", "ID", "Description", "Subcategory", "Amount"
    ));
    output.push_str(&"-".repeat(78));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_entry_row(entry, symbol));
        output.push('\n');
    }

    if entries.iter().any(|e| e.is_template()) {
        output.push_str("\n↻ recurring template\n");
    }

    output
}

/// Format entry details
pub fn format_entry_details(entry: &BudgetEntry, note_title: Option<&str>, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Entry: {}\n", entry.id));
    output.push_str(&format!("Date:        {}\n", entry.date.format("%Y-%m-%d")));
    output.push_str(&format!("Description: {}\n", entry.description));
    output.push_str(&format!("Type:        {}\n", entry.entry_type));
    output.push_str(&format!("Amount:      {}\n", money(entry.amount, symbol)));
    if let Some(sub) = &entry.sub_category {
        output.push_str(&format!("Subcategory: {}\n", sub));
    }
    output.push_str(&format!("Note:        {}\n", note_title.unwrap_or("(missing)")));

    if let Some(rec) = &entry.recurrence {
        output.push_str(&format!("Repeats:     {}\n", rec.frequency));
        if rec.is_finished() {
            output.push_str("Next:        (finished)\n");
        } else {
            output.push_str(&format!("Next:        {}\n", rec.next_date));
        }
        if let Some(end) = rec.ends_on {
            output.push_str(&format!("Ends on:     {}\n", end));
        }
    }
    if let Some(template) = entry.generated_from {
        output.push_str(&format!("Generated from: {}\n", template));
    }

    output
}

/// Format the income/expense totals of a month
pub fn format_monthly_summary(summary: &MonthlySummary, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", summary.month.long_name()));
    output.push_str(&separator(32));
    output.push('\n');
    output.push_str(&format!("Income:   {:>14}\n", money(summary.income, symbol)));
    output.push_str(&format!("Expense:  {:>14}\n", money(summary.expense, symbol)));
    output.push_str(&format!("Balance:  {:>14}\n", money(summary.balance, symbol)));
    output.push_str(&format!("Entries:  {:>14}\n", summary.count));
    output
}

/// Format an expense breakdown by sub-category
pub fn format_breakdown(rows: &[BreakdownRow], symbol: &str) -> String {
    if rows.is_empty() {
        return "No expenses this month.\n".to_string();
    }

    let width = rows
        .iter()
        .map(|r| r.sub_category.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    for row in rows {
        output.push_str(&format!(
            "{:<width$}  {:>12}  {:>5}  {}\n",
            row.sub_category,
            money(row.amount, symbol),
            format_percentage(row.percent),
            format_bar(row.percent, 100.0, 20),
            width = width
        ));
    }
    output
}

/// Format a sequence of monthly summaries, oldest first
pub fn format_trend(summaries: &[MonthlySummary], symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:7}  {:>12}  {:>12}  {:>12}\n",
        "Month", "Income", "Expense", "Balance"
    ));
    output.push_str(&"-".repeat(49));
    output.push('\n');

    for summary in summaries {
        output.push_str(&format!(
            "{:7}  {:>12}  {:>12}  {:>12}\n",
            summary.month.to_string(),
            money(summary.income, symbol),
            money(summary.expense, symbol),
            money(summary.balance, symbol)
        ));
    }
    output
}

/// Summarize a recurring-entry run
pub fn format_recurrence_run(run: &RecurrenceRun, symbol: &str) -> String {
    if run.generated.is_empty() {
        return "No recurring entries were due.\n".to_string();
    }

    let mut output = format!("Generated {} recurring entr(ies):\n", run.generated.len());
    for entry in &run.generated {
        output.push_str(&format_entry_row(entry, symbol));
        output.push('\n');
    }
    if run.skipped_existing > 0 {
        output.push_str(&format!("{} already existed and were skipped.\n", run.skipped_existing));
    }
    if run.capped_templates > 0 {
        output.push_str(&format!(
            "{} template(s) still have due entries; run again to continue.\n",
            run.capped_templates
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Money, Month, NoteId, Recurrence};
    use chrono::NaiveDate;

    fn entry(desc: &str, cents: i64, entry_type: EntryType) -> BudgetEntry {
        BudgetEntry::new(
            NoteId::new(),
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
            desc,
            entry_type,
            Money::from_cents(cents),
        )
    }

    #[test]
    fn test_entry_row_signs() {
        let income = format_entry_row(&entry("Salary", 250000, EntryType::Income), "$");
        let expense = format_entry_row(&entry("Rent", 90000, EntryType::Expense), "€");
        assert!(income.contains("+$2500.00"));
        assert!(expense.contains("-€900.00"));
    }

    #[test]
    fn test_entry_list_marks_templates() {
        let mut template = entry("Gym", 4000, EntryType::Expense);
        template.recurrence = Some(Recurrence::new(Frequency::Monthly, template.date, None));

        let output = format_entry_list(&[template], "$");
        assert!(output.contains("↻"));
        assert!(output.contains("recurring template"));
    }

    #[test]
    fn test_entry_details_recurrence() {
        let mut template = entry("Gym", 4000, EntryType::Expense);
        template.recurrence = Some(Recurrence::new(Frequency::Monthly, template.date, None));

        let output = format_entry_details(&template, Some("March"), "$");
        assert!(output.contains("Repeats:     monthly"));
        assert!(output.contains("Next:        2025-04-04"));
        assert!(output.contains("Note:        March"));
    }

    #[test]
    fn test_monthly_summary() {
        let summary = MonthlySummary {
            month: Month::new(2025, 3).unwrap(),
            income: Money::from_cents(100000),
            expense: Money::from_cents(25050),
            balance: Money::from_cents(74950),
            count: 4,
        };
        let output = format_monthly_summary(&summary, "$");
        assert!(output.contains("$749.50"));
        assert!(output.contains("Entries:"));
    }

    #[test]
    fn test_breakdown_empty() {
        assert_eq!(format_breakdown(&[], "$"), "No expenses this month.\n");
    }

    #[test]
    fn test_recurrence_run_empty() {
        let run = RecurrenceRun::default();
        assert!(format_recurrence_run(&run, "$").contains("No recurring entries"));
    }
}
