//! Budget limit service
//!
//! Per-category monthly spending ceilings. The `spent` figure of a limit is
//! derived: the sum of expense entries dated in the limit's month whose note
//! belongs to the limit's category.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{BudgetLimit, CategoryId, LimitId, Money, Month, NoteId};
use crate::storage::Storage;

/// Service for budget limit management
pub struct LimitService<'a> {
    storage: &'a Storage,
}

impl<'a> LimitService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create or update the limit of a category for a month, then recompute its spent total
    pub fn set(&self, category_id: CategoryId, month: Month, amount: Money) -> LedgerResult<BudgetLimit> {
        let category = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| LedgerError::category_not_found(category_id.to_string()))?;

        let before = self.storage.limits.get_for(category_id, month)?;
        let mut limit = match &before {
            Some(existing) => {
                let mut limit = existing.clone();
                limit.limit = amount;
                limit.is_active = true;
                limit.updated_at = chrono::Utc::now();
                limit
            }
            None => BudgetLimit::new(category_id, month, amount),
        };

        limit
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let spent = self.spent_for(category_id, month)?;
        limit.set_spent(spent);

        self.storage.limits.upsert(limit.clone())?;
        self.storage.limits.save()?;

        let name = Some(format!("{} {}", category.title, month));
        match before {
            Some(before) => self.storage.log_update(
                EntityType::BudgetLimit,
                limit.id.to_string(),
                name,
                &before,
                &limit,
            )?,
            None => self
                .storage
                .log_create(EntityType::BudgetLimit, limit.id.to_string(), name, &limit)?,
        }

        Ok(limit)
    }

    pub fn get(&self, id: LimitId) -> LedgerResult<Option<BudgetLimit>> {
        self.storage.limits.get(id)
    }

    /// Find a limit by full or short id (`lim-1a2b3c4d`)
    pub fn find(&self, identifier: &str) -> LedgerResult<BudgetLimit> {
        if let Ok(id) = identifier.parse::<LimitId>() {
            if let Some(limit) = self.storage.limits.get(id)? {
                return Ok(limit);
            }
        }

        let mut matches = self.storage.limits.find_by_short_id(identifier)?;
        match matches.len() {
            1 => Ok(matches.remove(0)),
            0 => Err(LedgerError::limit_not_found(identifier)),
            n => Err(LedgerError::Validation(format!(
                "'{}' matches {} limits; use a longer id",
                identifier, n
            ))),
        }
    }

    /// Limits of one month, or all limits
    pub fn list(&self, month: Option<Month>) -> LedgerResult<Vec<BudgetLimit>> {
        match month {
            Some(month) => self.storage.limits.get_by_month(month),
            None => self.storage.limits.get_all(),
        }
    }

    /// Active limits whose spent total exceeds the ceiling
    pub fn over_budget(&self) -> LedgerResult<Vec<BudgetLimit>> {
        Ok(self
            .storage
            .limits
            .get_all()?
            .into_iter()
            .filter(|l| l.is_active && l.is_over())
            .collect())
    }

    pub fn deactivate(&self, id: LimitId) -> LedgerResult<BudgetLimit> {
        let before = self
            .storage
            .limits
            .get(id)?
            .ok_or_else(|| LedgerError::limit_not_found(id.to_string()))?;

        let mut limit = before.clone();
        limit.is_active = false;
        limit.updated_at = chrono::Utc::now();

        self.storage.limits.upsert(limit.clone())?;
        self.storage.limits.save()?;
        self.storage
            .log_update(EntityType::BudgetLimit, id.to_string(), None, &before, &limit)?;

        Ok(limit)
    }

    pub fn remove(&self, id: LimitId) -> LedgerResult<BudgetLimit> {
        let limit = self
            .storage
            .limits
            .delete(id)?
            .ok_or_else(|| LedgerError::limit_not_found(id.to_string()))?;

        self.storage.limits.save()?;
        self.storage
            .log_delete(EntityType::BudgetLimit, id.to_string(), None, &limit)?;

        Ok(limit)
    }

    /// Spent total of a category in a month
    pub fn spent_for(&self, category_id: CategoryId, month: Month) -> LedgerResult<Money> {
        let categories = self.note_categories()?;
        Ok(self.spent_by_category(month, &categories)?
            .remove(&category_id)
            .unwrap_or_default())
    }

    /// Recompute the spent totals of every limit in `month`
    ///
    /// Returns the number of limits whose total changed.
    pub fn recompute(&self, month: Month) -> LedgerResult<usize> {
        self.recompute_months([month])
    }

    /// Recompute limits for each of `months` that has limits, saving once
    pub fn recompute_months<I>(&self, months: I) -> LedgerResult<usize>
    where
        I: IntoIterator<Item = Month>,
    {
        let with_limits = self.storage.limits.months()?;
        let months: BTreeSet<Month> = months
            .into_iter()
            .filter(|m| with_limits.contains(m))
            .collect();
        if months.is_empty() {
            return Ok(0);
        }

        let categories = self.note_categories()?;
        let mut changed = 0;

        for month in months {
            let spent = self.spent_by_category(month, &categories)?;
            for mut limit in self.storage.limits.get_by_month(month)? {
                let total = spent.get(&limit.category_id).copied().unwrap_or_default();
                if limit.set_spent(total) {
                    self.storage.limits.upsert(limit)?;
                    changed += 1;
                }
            }
        }

        if changed > 0 {
            self.storage.limits.save()?;
        }
        debug!(changed, "recomputed budget limits");

        Ok(changed)
    }

    /// Recompute every month that has a limit
    pub fn recompute_all(&self) -> LedgerResult<usize> {
        let months = self.storage.limits.months()?;
        self.recompute_months(months)
    }

    fn note_categories(&self) -> LedgerResult<HashMap<NoteId, CategoryId>> {
        Ok(self
            .storage
            .notes
            .get_all()?
            .into_iter()
            .map(|n| (n.id, n.category_id))
            .collect())
    }

    fn spent_by_category(
        &self,
        month: Month,
        categories: &HashMap<NoteId, CategoryId>,
    ) -> LedgerResult<HashMap<CategoryId, Money>> {
        let mut totals: HashMap<CategoryId, Money> = HashMap::new();
        for entry in self.storage.entries.get_by_month(month)? {
            if !entry.is_expense() {
                continue;
            }
            if let Some(category_id) = categories.get(&entry.note_id) {
                *totals.entry(*category_id).or_default() += entry.amount;
            }
        }
        Ok(totals)
    }
}
