//! Category repository for JSON storage
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::LedgerError;
use crate::models::{Category, CategoryId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_err;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

/// Repository for category persistence
pub struct CategoryRepository {
    path: PathBuf,
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            categories: RwLock::new(HashMap::new()),
        }
    }

    /// Load categories from disk
    pub fn load(&self) -> Result<(), LedgerError> {
        let file_data: CategoryData = read_json(&self.path)?;
        let mut categories = self.categories.write().map_err(lock_err)?;

        categories.clear();
        for category in file_data.categories {
            categories.insert(category.id, category);
        }

        Ok(())
    }

    /// Save categories to disk
    pub fn save(&self) -> Result<(), LedgerError> {
        let categories = self.get_all()?;
        write_json_atomic(&self.path, &CategoryData { categories })
    }

    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, LedgerError> {
        let categories = self.categories.read().map_err(lock_err)?;
        Ok(categories.get(&id).cloned())
    }

    /// Get all categories ordered by sort order, then title
    pub fn get_all(&self) -> Result<Vec<Category>, LedgerError> {
        let categories = self.categories.read().map_err(lock_err)?;
        let mut list: Vec<_> = categories.values().cloned().collect();
        list.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        });
        Ok(list)
    }

    /// Get a category by title (case-insensitive)
    pub fn get_by_title(&self, title: &str) -> Result<Option<Category>, LedgerError> {
        let title = title.trim().to_lowercase();
        let categories = self.categories.read().map_err(lock_err)?;
        Ok(categories
            .values()
            .find(|c| c.title.to_lowercase() == title)
            .cloned())
    }

    /// Get the default category, if one exists
    pub fn get_default(&self) -> Result<Option<Category>, LedgerError> {
        let categories = self.categories.read().map_err(lock_err)?;
        Ok(categories.values().find(|c| c.is_default).cloned())
    }

    pub fn upsert(&self, category: Category) -> Result<(), LedgerError> {
        let mut categories = self.categories.write().map_err(lock_err)?;
        categories.insert(category.id, category);
        Ok(())
    }

    pub fn delete(&self, id: CategoryId) -> Result<Option<Category>, LedgerError> {
        let mut categories = self.categories.write().map_err(lock_err)?;
        Ok(categories.remove(&id))
    }

    pub fn count(&self) -> Result<usize, LedgerError> {
        let categories = self.categories.read().map_err(lock_err)?;
        Ok(categories.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_lookup_and_title_search() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        repo.load().unwrap();

        assert!(repo.get_default().unwrap().is_none());

        let default = Category::default_category();
        repo.upsert(default.clone()).unwrap();
        repo.upsert(Category::new("Travel")).unwrap();

        assert_eq!(repo.get_default().unwrap().unwrap().id, default.id);
        assert!(repo.get_by_title("  travel ").unwrap().is_some());
        assert!(repo.get_by_title("Food").unwrap().is_none());
    }

    #[test]
    fn test_sorted_by_order_then_title() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("categories.json");
        let repo = CategoryRepository::new(path.clone());

        let mut b = Category::new("beta");
        b.sort_order = 1;
        let mut a = Category::new("Alpha");
        a.sort_order = 1;
        let mut first = Category::new("Zeta");
        first.sort_order = 0;
        repo.upsert(b).unwrap();
        repo.upsert(a).unwrap();
        repo.upsert(first).unwrap();
        repo.save().unwrap();

        let reloaded = CategoryRepository::new(path);
        reloaded.load().unwrap();
        let titles: Vec<_> = reloaded
            .get_all()
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Zeta", "Alpha", "beta"]);
    }
}
