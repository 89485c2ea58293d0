//! Budget entry service
//!
//! Income and expense entries attached to notes, monthly summaries and
//! breakdowns. Every mutation re-derives the budget limits of the months it
//! touches.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    Archive, BudgetEntry, EntryId, EntryType, Frequency, Money, Month, NoteId, Recurrence,
};
use crate::storage::Storage;

use super::LimitService;

/// Label for expenses without a sub-category in breakdowns
pub const UNCATEGORIZED_LABEL: &str = "Other";

/// Longest span a trend report covers
pub const MAX_TREND_MONTHS: usize = 120;

/// Service for budget entries
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Fields of a new entry
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub note_id: NoteId,
    pub description: String,
    pub amount: Money,
    pub entry_type: EntryType,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    pub sub_category: Option<String>,
    /// Makes the entry a recurring template anchored at its date
    pub frequency: Option<Frequency>,
    pub ends_on: Option<NaiveDate>,
}

impl NewEntry {
    pub fn new(note_id: NoteId, description: impl Into<String>, amount: Money, entry_type: EntryType) -> Self {
        Self {
            note_id,
            description: description.into(),
            amount,
            entry_type,
            date: None,
            sub_category: None,
            frequency: None,
            ends_on: None,
        }
    }
}

/// Optional field changes for [`BudgetService::update`]
///
/// An empty `sub_category` clears it.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub description: Option<String>,
    pub amount: Option<Money>,
    pub entry_type: Option<EntryType>,
    pub date: Option<NaiveDate>,
    pub sub_category: Option<String>,
}

/// Income and expense totals of one month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySummary {
    pub month: Month,
    pub income: Money,
    pub expense: Money,
    /// income - expense
    pub balance: Money,
    pub count: usize,
}

/// One line of an expense breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub sub_category: String,
    pub amount: Money,
    /// Share of the month's expenses, 0-100
    pub percent: f64,
}

fn normalize_sub_category(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn summarize(month: Month, entries: &[BudgetEntry]) -> MonthlySummary {
    let (income, expense) = entries.iter().fold((Money::zero(), Money::zero()), |(i, e), entry| {
        match entry.entry_type {
            EntryType::Income => (i + entry.amount, e),
            EntryType::Expense => (i, e + entry.amount),
        }
    });

    MonthlySummary {
        month,
        income,
        expense,
        balance: income - expense,
        count: entries.len(),
    }
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Add an entry to a note; the note becomes a budget note if it was not one
    pub fn add(&self, new: NewEntry) -> LedgerResult<BudgetEntry> {
        let note = self
            .storage
            .notes
            .get(new.note_id)?
            .ok_or_else(|| LedgerError::note_not_found(new.note_id.to_string()))?;

        let date = new.date.unwrap_or_else(|| Local::now().date_naive());
        let mut entry = BudgetEntry::new(
            note.id,
            date,
            new.description.trim(),
            new.entry_type,
            new.amount,
        );
        entry.sub_category = normalize_sub_category(new.sub_category);

        if let Some(frequency) = new.frequency {
            if let Some(end) = new.ends_on {
                if end < date {
                    return Err(LedgerError::Validation(format!(
                        "Recurrence end {} is before the entry date {}",
                        end, date
                    )));
                }
            }
            entry.recurrence = Some(Recurrence::new(frequency, date, new.ends_on));
        } else if new.ends_on.is_some() {
            return Err(LedgerError::Validation(
                "An end date needs a recurrence frequency".into(),
            ));
        }

        entry
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        if !note.is_budget {
            let mut flagged = note.clone();
            flagged.is_budget = true;
            flagged.touch();
            self.storage.notes.upsert(flagged.clone())?;
            self.storage.notes.save()?;
            self.storage.log_update(
                EntityType::Note,
                flagged.id.to_string(),
                Some(flagged.title.clone()),
                &note,
                &flagged,
            )?;
        }

        self.storage.entries.upsert(entry.clone())?;
        self.storage.entries.save()?;
        self.storage.log_create(
            EntityType::BudgetEntry,
            entry.id.to_string(),
            Some(entry.description.clone()),
            &entry,
        )?;
        info!(id = %entry.id, amount = %entry.amount, kind = %entry.entry_type, "added budget entry");

        LimitService::new(self.storage).recompute(Month::of(entry.date))?;

        Ok(entry)
    }

    pub fn get(&self, id: EntryId) -> LedgerResult<Option<BudgetEntry>> {
        self.storage.entries.get(id)
    }

    /// Find an entry by full or short id (`ent-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> LedgerResult<BudgetEntry> {
        if let Ok(id) = identifier.parse::<EntryId>() {
            if let Some(entry) = self.storage.entries.get(id)? {
                return Ok(entry);
            }
        }

        let mut matches = self.storage.entries.find_by_short_id(identifier)?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(LedgerError::entry_not_found(identifier)),
            n => Err(LedgerError::Validation(format!(
                "'{}' matches {} entries; use a longer id",
                identifier, n
            ))),
        }
    }

    pub fn update(&self, id: EntryId, changes: EntryUpdate) -> LedgerResult<BudgetEntry> {
        let before = self.require(id)?;
        let mut entry = before.clone();

        if let Some(description) = changes.description {
            entry.description = description.trim().to_string();
        }
        if let Some(amount) = changes.amount {
            entry.amount = amount;
        }
        if let Some(entry_type) = changes.entry_type {
            entry.entry_type = entry_type;
        }
        if let Some(date) = changes.date {
            entry.date = date;
            if let Some(recurrence) = entry.recurrence.as_mut() {
                if recurrence.anchor != date {
                    recurrence.reanchor(date, self.storage.entries.latest_occurrence(id)?);
                }
            }
        }
        if let Some(sub_category) = changes.sub_category {
            entry.sub_category = normalize_sub_category(Some(sub_category));
        }

        entry
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;
        entry.touch();

        self.storage.entries.upsert(entry.clone())?;
        self.storage.entries.save()?;
        self.storage.log_update(
            EntityType::BudgetEntry,
            id.to_string(),
            Some(entry.description.clone()),
            &before,
            &entry,
        )?;

        LimitService::new(self.storage)
            .recompute_months([Month::of(before.date), Month::of(entry.date)])?;

        Ok(entry)
    }

    /// Stop a template from generating further occurrences
    ///
    /// Occurrences already generated are kept.
    pub fn stop_recurrence(&self, id: EntryId) -> LedgerResult<BudgetEntry> {
        let before = self.require(id)?;
        if before.recurrence.is_none() {
            return Err(LedgerError::Validation(format!(
                "Entry '{}' is not recurring",
                before.description
            )));
        }

        let mut entry = before.clone();
        entry.recurrence = None;
        entry.touch();

        self.storage.entries.upsert(entry.clone())?;
        self.storage.entries.save()?;
        self.storage.log_update(
            EntityType::BudgetEntry,
            id.to_string(),
            Some(entry.description.clone()),
            &before,
            &entry,
        )?;

        Ok(entry)
    }

    /// Archive an entry and remove it
    pub fn delete(&self, id: EntryId) -> LedgerResult<Archive> {
        let entry = self.require(id)?;

        let archive = Archive::of_entry(&entry)?;
        self.storage.archives.insert(archive.clone())?;
        self.storage.entries.delete(id)?;

        self.storage.entries.save()?;
        self.storage.archives.save()?;
        self.storage.log_archive(
            EntityType::BudgetEntry,
            id.to_string(),
            Some(entry.description.clone()),
            &entry,
        )?;

        LimitService::new(self.storage).recompute(Month::of(entry.date))?;

        Ok(archive)
    }

    pub fn list_all(&self) -> LedgerResult<Vec<BudgetEntry>> {
        self.storage.entries.get_all()
    }

    /// Entries of a month, newest first, optionally of one type only
    pub fn list_by_month(&self, month: Month, entry_type: Option<EntryType>) -> LedgerResult<Vec<BudgetEntry>> {
        Ok(self
            .storage
            .entries
            .get_by_month(month)?
            .into_iter()
            .filter(|e| entry_type.map_or(true, |t| e.entry_type == t))
            .collect())
    }

    pub fn list_by_note(&self, note_id: NoteId) -> LedgerResult<Vec<BudgetEntry>> {
        self.storage.entries.get_by_note(note_id)
    }

    /// Recurring templates, oldest anchor first
    pub fn list_templates(&self) -> LedgerResult<Vec<BudgetEntry>> {
        self.storage.entries.get_templates()
    }

    pub fn monthly_summary(&self, month: Month) -> LedgerResult<MonthlySummary> {
        let entries = self.storage.entries.get_by_month(month)?;
        Ok(summarize(month, &entries))
    }

    /// Distinct sub-categories used in a month, sorted
    pub fn sub_categories(&self, month: Month) -> LedgerResult<Vec<String>> {
        let names: BTreeSet<String> = self
            .storage
            .entries
            .get_by_month(month)?
            .into_iter()
            .filter_map(|e| e.sub_category)
            .collect();
        Ok(names.into_iter().collect())
    }

    /// Expense totals per sub-category, largest first
    pub fn expense_breakdown(&self, month: Month) -> LedgerResult<Vec<BreakdownRow>> {
        let mut totals: BTreeMap<String, Money> = BTreeMap::new();
        for entry in self.storage.entries.get_by_month(month)? {
            if entry.is_expense() {
                let key = entry
                    .sub_category
                    .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());
                *totals.entry(key).or_default() += entry.amount;
            }
        }

        let total: Money = totals.values().copied().sum();
        let mut rows: Vec<BreakdownRow> = totals
            .into_iter()
            .map(|(sub_category, amount)| BreakdownRow {
                percent: if total.is_zero() {
                    0.0
                } else {
                    amount.cents() as f64 / total.cents() as f64 * 100.0
                },
                sub_category,
                amount,
            })
            .collect();
        rows.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.sub_category.cmp(&b.sub_category)));

        Ok(rows)
    }

    /// Summaries of the `months` months ending at `end`, oldest first
    pub fn trend(&self, end: Month, months: usize) -> LedgerResult<Vec<MonthlySummary>> {
        if months == 0 || months > MAX_TREND_MONTHS {
            return Err(LedgerError::Validation(format!(
                "Trend covers 1 to {} months (got {})",
                MAX_TREND_MONTHS, months
            )));
        }
        let all = self.storage.entries.get_all()?;
        Ok(end
            .trailing(months)
            .into_iter()
            .map(|month| {
                let in_month: Vec<BudgetEntry> = all
                    .iter()
                    .filter(|e| month.contains(e.date))
                    .cloned()
                    .collect();
                summarize(month, &in_month)
            })
            .collect())
    }

    fn require(&self, id: EntryId) -> LedgerResult<BudgetEntry> {
        self.storage
            .entries
            .get(id)?
            .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{ArchiveKind, Category, Note};
    use crate::services::RecurrenceService;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup_note(storage: &Storage) -> Note {
        let category = Category::new("Home");
        storage.categories.upsert(category.clone()).unwrap();
        let note = Note::new("Household", "", category.id);
        storage.notes.upsert(note.clone()).unwrap();
        note
    }

    fn entry(note: &Note, desc: &str, cents: i64, kind: EntryType, on: NaiveDate) -> NewEntry {
        NewEntry {
            date: Some(on),
            ..NewEntry::new(note.id, desc, Money::from_cents(cents), kind)
        }
    }

    #[test]
    fn test_add_flags_note_as_budget() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);

        service
            .add(entry(&note, "Salary", 300000, EntryType::Income, date(2025, 5, 1)))
            .unwrap();

        assert!(storage.notes.get(note.id).unwrap().unwrap().is_budget);
    }

    #[test]
    fn test_add_validation() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);

        let zero = entry(&note, "Nothing", 0, EntryType::Expense, date(2025, 5, 1));
        assert!(service.add(zero).unwrap_err().is_validation());

        let blank = entry(&note, "  ", 100, EntryType::Expense, date(2025, 5, 1));
        assert!(service.add(blank).unwrap_err().is_validation());

        let orphan = NewEntry::new(NoteId::new(), "x", Money::from_cents(1), EntryType::Expense);
        assert!(service.add(orphan).unwrap_err().is_not_found());

        let bad_end = NewEntry {
            frequency: Some(Frequency::Monthly),
            ends_on: Some(date(2025, 4, 1)),
            ..entry(&note, "Rent", 100, EntryType::Expense, date(2025, 5, 1))
        };
        assert!(service.add(bad_end).unwrap_err().is_validation());
    }

    #[test]
    fn test_recurring_add_sets_template() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);

        let rent = service
            .add(NewEntry {
                frequency: Some(Frequency::Monthly),
                ..entry(&note, "Rent", 90000, EntryType::Expense, date(2025, 1, 31))
            })
            .unwrap();

        let recurrence = rent.recurrence.unwrap();
        assert_eq!(recurrence.anchor, date(2025, 1, 31));
        assert_eq!(recurrence.step, 1);
        assert_eq!(recurrence.next_date, date(2025, 2, 28));

        let stopped = service.stop_recurrence(rent.id).unwrap();
        assert!(stopped.recurrence.is_none());
        assert!(service.stop_recurrence(rent.id).unwrap_err().is_validation());
    }

    #[test]
    fn test_monthly_summary_and_breakdown() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);
        let may = date(2025, 5, 10);

        service
            .add(entry(&note, "Salary", 200000, EntryType::Income, may))
            .unwrap();
        service
            .add(NewEntry {
                sub_category: Some("Food".into()),
                ..entry(&note, "Market", 30000, EntryType::Expense, may)
            })
            .unwrap();
        service
            .add(NewEntry {
                sub_category: Some("Food".into()),
                ..entry(&note, "Bakery", 10000, EntryType::Expense, may)
            })
            .unwrap();
        service
            .add(entry(&note, "Misc", 60000, EntryType::Expense, may))
            .unwrap();

        let month = Month::of(may);
        let summary = service.monthly_summary(month).unwrap();
        assert_eq!(summary.income, Money::from_cents(200000));
        assert_eq!(summary.expense, Money::from_cents(100000));
        assert_eq!(summary.balance, Money::from_cents(100000));
        assert_eq!(summary.count, 4);

        let breakdown = service.expense_breakdown(month).unwrap();
        assert_eq!(breakdown[0].sub_category, UNCATEGORIZED_LABEL);
        assert_eq!(breakdown[1].sub_category, "Food");
        assert_eq!(breakdown[1].amount, Money::from_cents(40000));
        assert!((breakdown[0].percent - 60.0).abs() < 1e-9);

        assert_eq!(service.sub_categories(month).unwrap(), vec!["Food"]);
        assert_eq!(
            service
                .list_by_month(month, Some(EntryType::Income))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_empty_month_summary_is_zero() {
        let (_temp, storage) = create_test_storage();
        let service = BudgetService::new(&storage);
        let summary = service.monthly_summary(Month::new(2020, 2).unwrap()).unwrap();
        assert!(summary.income.is_zero() && summary.expense.is_zero() && summary.balance.is_zero());
        assert_eq!(summary.count, 0);
    }

    #[test]
    fn test_large_amounts_rejected_and_totals_saturate() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);
        let march = date(2025, 3, 10);

        let too_big = entry(&note, "Yacht", 9_000_000_000_000_000_000, EntryType::Expense, march);
        assert!(service.add(too_big).unwrap_err().is_validation());

        let at_max = entry(&note, "House", Money::MAX.cents(), EntryType::Expense, march);
        service.add(at_max.clone()).unwrap();
        service.add(at_max).unwrap();
        let summary = service.monthly_summary(Month::of(march)).unwrap();
        assert_eq!(summary.expense.cents(), 2 * Money::MAX.cents());

        // Records that bypassed validation still cannot overflow the totals
        for _ in 0..2 {
            storage
                .entries
                .upsert(BudgetEntry::new(
                    note.id,
                    march,
                    "Legacy",
                    EntryType::Expense,
                    Money::from_cents(9_000_000_000_000_000_000),
                ))
                .unwrap();
        }
        let summary = service.monthly_summary(Month::of(march)).unwrap();
        assert_eq!(summary.expense.cents(), i64::MAX);
        assert_eq!(summary.balance.cents(), -i64::MAX);
    }

    #[test]
    fn test_trend_oldest_first() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);
        service
            .add(entry(&note, "Gift", 5000, EntryType::Income, date(2025, 3, 3)))
            .unwrap();

        let trend = service.trend(Month::new(2025, 4).unwrap(), 3).unwrap();
        let months: Vec<String> = trend.iter().map(|s| s.month.to_string()).collect();
        assert_eq!(months, vec!["2025-02", "2025-03", "2025-04"]);
        assert_eq!(trend[1].income, Money::from_cents(5000));

        assert_eq!(service.trend(Month::new(2025, 4).unwrap(), MAX_TREND_MONTHS).unwrap().len(), 120);
        assert!(service.trend(Month::new(2025, 4).unwrap(), 0).unwrap_err().is_validation());
        assert!(service
            .trend(Month::new(2025, 4).unwrap(), usize::MAX)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_update_moves_entry_and_reanchors() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);
        let gym = service
            .add(NewEntry {
                frequency: Some(Frequency::Weekly),
                ..entry(&note, "Gym", 1500, EntryType::Expense, date(2025, 5, 5))
            })
            .unwrap();

        let updated = service
            .update(
                gym.id,
                EntryUpdate {
                    date: Some(date(2025, 5, 7)),
                    sub_category: Some("Health".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        let recurrence = updated.recurrence.unwrap();
        assert_eq!(recurrence.anchor, date(2025, 5, 7));
        assert_eq!(recurrence.next_date, date(2025, 5, 14));
        assert_eq!(updated.sub_category.as_deref(), Some("Health"));
    }

    #[test]
    fn test_redating_template_keeps_generated_periods() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);
        let recurrence = RecurrenceService::new(&storage);
        let rent = service
            .add(NewEntry {
                frequency: Some(Frequency::Monthly),
                ..entry(&note, "Rent", 90000, EntryType::Expense, date(2025, 1, 31))
            })
            .unwrap();

        assert_eq!(recurrence.process_due(date(2025, 4, 30)).unwrap().generated.len(), 3);

        let moved = service
            .update(
                rent.id,
                EntryUpdate {
                    date: Some(date(2025, 1, 30)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(moved.recurrence.unwrap().next_date, date(2025, 5, 30));

        assert!(recurrence.process_due(date(2025, 4, 30)).unwrap().generated.is_empty());
        let march: Vec<_> = service
            .list_by_month(Month::new(2025, 3).unwrap(), None)
            .unwrap()
            .into_iter()
            .filter(|e| e.generated_from == Some(rent.id))
            .collect();
        assert_eq!(march.len(), 1);

        let run = recurrence.process_due(date(2025, 5, 31)).unwrap();
        assert_eq!(run.generated.len(), 1);
        assert_eq!(run.generated[0].date, date(2025, 5, 30));
    }

    #[test]
    fn test_delete_archives_entry() {
        let (_temp, storage) = create_test_storage();
        let note = setup_note(&storage);
        let service = BudgetService::new(&storage);
        let coffee = service
            .add(entry(&note, "Coffee", 350, EntryType::Expense, date(2025, 5, 5)))
            .unwrap();

        let archive = service.delete(coffee.id).unwrap();
        assert_eq!(archive.kind, ArchiveKind::BudgetEntry);
        assert_eq!(archive.entry_snapshot().unwrap().id, coffee.id);
        assert!(service.get(coffee.id).unwrap().is_none());
        assert!(service.find(&coffee.id.to_string()).unwrap_err().is_not_found());
    }
}
