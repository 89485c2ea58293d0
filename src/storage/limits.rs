//! Budget limit repository for JSON storage
//!
//! Manages loading and saving per-category monthly limits to limits.json

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{BudgetLimit, CategoryId, LimitId, Month};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct LimitData {
    limits: Vec<BudgetLimit>,
}

/// Repository for budget limit persistence
pub struct LimitRepository {
    path: PathBuf,
    data: RwLock<HashMap<LimitId, BudgetLimit>>,
}

impl LimitRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: LimitData = read_json(&self.path)?;
        let mut data = self.data.write().map_err(lock_err)?;

        data.clear();
        for limit in file_data.limits {
            data.insert(limit.id, limit);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), LedgerError> {
        let limits = self.get_all()?;
        write_json_atomic(&self.path, &LimitData { limits })
    }

    pub fn get(&self, id: LimitId) -> Result<Option<BudgetLimit>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.get(&id).cloned())
    }

    /// All limits, newest month first
    pub fn get_all(&self) -> Result<Vec<BudgetLimit>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        let mut limits: Vec<_> = data.values().cloned().collect();
        limits.sort_by(|a, b| b.month.cmp(&a.month).then(a.created_at.cmp(&b.created_at)));
        Ok(limits)
    }

    pub fn get_by_month(&self, month: Month) -> Result<Vec<BudgetLimit>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|l| l.month == month)
            .collect())
    }

    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<BudgetLimit>, LedgerError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|l| l.category_id == category_id)
            .collect())
    }

    /// The limit of a category for a month, if one is set
    pub fn get_for(&self, category_id: CategoryId, month: Month) -> Result<Option<BudgetLimit>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .find(|l| l.category_id == category_id && l.month == month)
            .cloned())
    }

    /// Distinct months that have at least one limit
    pub fn months(&self) -> Result<BTreeSet<Month>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.values().map(|l| l.month).collect())
    }

    pub fn find_by_short_id(&self, short: &str) -> Result<Vec<BudgetLimit>, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data
            .values()
            .filter(|l| l.id.matches_short(short))
            .cloned()
            .collect())
    }

    pub fn upsert(&self, limit: BudgetLimit) -> Result<(), LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        data.insert(limit.id, limit);
        Ok(())
    }

    pub fn delete(&self, id: LimitId) -> Result<Option<BudgetLimit>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        Ok(data.remove(&id))
    }

    /// Remove every limit of a category, returning the removed limits
    pub fn delete_by_category(&self, category_id: CategoryId) -> Result<Vec<BudgetLimit>, LedgerError> {
        let mut data = self.data.write().map_err(lock_err)?;
        let ids: Vec<_> = data
            .values()
            .filter(|l| l.category_id == category_id)
            .map(|l| l.id)
            .collect();
        Ok(ids.into_iter().filter_map(|id| data.remove(&id)).collect())
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let data = self.data.read().map_err(lock_err)?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_by_category_and_month() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LimitRepository::new(temp_dir.path().join("limits.json"));
        let food = CategoryId::new();
        let jan = Month::new(2025, 1).unwrap();
        let feb = jan.next();

        repo.upsert(BudgetLimit::new(food, jan, Money::from_cents(30000))).unwrap();
        repo.upsert(BudgetLimit::new(food, feb, Money::from_cents(25000))).unwrap();
        repo.save().unwrap();

        let reloaded = LimitRepository::new(temp_dir.path().join("limits.json"));
        reloaded.load().unwrap();

        let found = reloaded.get_for(food, feb).unwrap().unwrap();
        assert_eq!(found.limit, Money::from_cents(25000));
        assert!(reloaded.get_for(CategoryId::new(), feb).unwrap().is_none());
        assert_eq!(reloaded.months().unwrap().len(), 2);
        assert_eq!(reloaded.get_all().unwrap()[0].month, feb);
    }

    #[test]
    fn test_delete_by_category() {
        let temp_dir = TempDir::new().unwrap();
        let repo = LimitRepository::new(temp_dir.path().join("limits.json"));
        let food = CategoryId::new();
        let jan = Month::new(2025, 1).unwrap();

        repo.upsert(BudgetLimit::new(food, jan, Money::from_cents(100))).unwrap();
        repo.upsert(BudgetLimit::new(CategoryId::new(), jan, Money::from_cents(100))).unwrap();

        assert_eq!(repo.delete_by_category(food).unwrap().len(), 1);
        assert_eq!(repo.count().unwrap(), 1);
    }
}
