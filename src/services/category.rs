//! Category service
//!
//! Categories group notes. Exactly one category is the default; it is
//! created on first run and cannot be deleted.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Category, CategoryId, DEFAULT_CATEGORY_TITLE};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

/// Optional field changes for [`CategoryService::update`]
///
/// An empty string clears `color` or `icon`.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate<'u> {
    pub title: Option<&'u str>,
    pub color: Option<&'u str>,
    pub icon: Option<&'u str>,
}

fn clearable(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a category at the end of the sort order
    pub fn create(&self, title: &str, color: Option<&str>, icon: Option<&str>) -> LedgerResult<Category> {
        let title = title.trim();
        self.ensure_unique_title(title, None)?;

        let max_order = self
            .storage
            .categories
            .get_all()?
            .iter()
            .map(|c| c.sort_order)
            .max()
            .unwrap_or(-1);

        let mut category = Category::new(title);
        category.sort_order = max_order + 1;
        category.color = color.and_then(clearable);
        category.icon = icon.and_then(clearable);

        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.title.clone()),
            &category,
        )?;
        info!(title = %category.title, "created category");

        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> LedgerResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by title or id
    pub fn find(&self, identifier: &str) -> LedgerResult<Option<Category>> {
        if let Some(category) = self.storage.categories.get_by_title(identifier)? {
            return Ok(Some(category));
        }

        if let Ok(id) = identifier.parse::<CategoryId>() {
            return self.storage.categories.get(id);
        }

        Ok(self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .find(|c| c.id.matches_short(identifier)))
    }

    /// Like [`find`](Self::find) but a miss is an error
    pub fn resolve(&self, identifier: &str) -> LedgerResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| LedgerError::category_not_found(identifier))
    }

    pub fn list(&self) -> LedgerResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    /// Number of notes filed under a category
    pub fn note_count(&self, id: CategoryId) -> LedgerResult<usize> {
        self.storage.notes.count_by_category(id)
    }

    pub fn update(&self, id: CategoryId, changes: CategoryUpdate<'_>) -> LedgerResult<Category> {
        let before = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;
        let mut category = before.clone();

        if let Some(title) = changes.title {
            let title = title.trim();
            self.ensure_unique_title(title, Some(id))?;
            category.title = title.to_string();
        }
        if let Some(color) = changes.color {
            category.color = clearable(color);
        }
        if let Some(icon) = changes.icon {
            category.icon = clearable(icon);
        }

        category
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.log_update(
            EntityType::Category,
            id.to_string(),
            Some(category.title.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Put the listed categories first, in the given order
    ///
    /// Categories left out keep their relative order after the listed ones.
    pub fn reorder(&self, ids: &[CategoryId]) -> LedgerResult<Vec<Category>> {
        let current = self.storage.categories.get_all()?;

        for id in ids {
            if !current.iter().any(|c| c.id == *id) {
                return Err(LedgerError::category_not_found(id.to_string()));
            }
        }

        let mut ordered: Vec<Category> = Vec::with_capacity(current.len());
        for id in ids {
            if ordered.iter().any(|c| c.id == *id) {
                continue;
            }
            if let Some(category) = current.iter().find(|c| c.id == *id) {
                ordered.push(category.clone());
            }
        }
        for category in &current {
            if !ordered.iter().any(|c| c.id == category.id) {
                ordered.push(category.clone());
            }
        }

        for (position, category) in ordered.iter_mut().enumerate() {
            let position = position as i32;
            if category.sort_order != position {
                let before = category.clone();
                category.sort_order = position;
                self.storage.categories.upsert(category.clone())?;
                self.storage.log_update(
                    EntityType::Category,
                    category.id.to_string(),
                    Some(category.title.clone()),
                    &before,
                    &*category,
                )?;
            }
        }
        self.storage.categories.save()?;

        Ok(ordered)
    }

    /// Delete a category together with its budget limits
    ///
    /// The default category and categories that still hold notes cannot be deleted.
    pub fn delete(&self, id: CategoryId) -> LedgerResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| LedgerError::category_not_found(id.to_string()))?;

        if category.is_default {
            return Err(LedgerError::Validation(format!(
                "'{}' is the default category and cannot be deleted",
                category.title
            )));
        }

        let notes = self.note_count(id)?;
        if notes > 0 {
            return Err(LedgerError::Validation(format!(
                "Category '{}' still has {} note(s); move or delete them first",
                category.title, notes
            )));
        }

        let limits = self.storage.limits.delete_by_category(id)?;
        self.storage.categories.delete(id)?;

        self.storage.categories.save()?;
        if !limits.is_empty() {
            self.storage.limits.save()?;
        }

        for limit in &limits {
            self.storage
                .log_delete(EntityType::BudgetLimit, limit.id.to_string(), None, limit)?;
        }
        self.storage.log_delete(
            EntityType::Category,
            id.to_string(),
            Some(category.title.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// The default category, creating it if it went missing
    pub fn ensure_default(&self) -> LedgerResult<Category> {
        if let Some(category) = self.storage.categories.get_default()? {
            return Ok(category);
        }

        // A user category may already carry the default title
        if let Some(existing) = self.storage.categories.get_by_title(DEFAULT_CATEGORY_TITLE)? {
            let mut promoted = existing.clone();
            promoted.is_default = true;
            self.storage.categories.upsert(promoted.clone())?;
            self.storage.categories.save()?;
            self.storage.log_update(
                EntityType::Category,
                promoted.id.to_string(),
                Some(promoted.title.clone()),
                &existing,
                &promoted,
            )?;
            return Ok(promoted);
        }

        let mut category = Category::default_category();
        category.sort_order = self
            .storage
            .categories
            .get_all()?
            .iter()
            .map(|c| c.sort_order)
            .min()
            .map_or(0, |min| min.min(1) - 1);

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.title.clone()),
            &category,
        )?;
        info!("restored missing default category");

        Ok(category)
    }

    fn ensure_unique_title(&self, title: &str, except: Option<CategoryId>) -> LedgerResult<()> {
        if let Some(existing) = self.storage.categories.get_by_title(title)? {
            if Some(existing.id) != except {
                return Err(LedgerError::Duplicate {
                    entity_type: "Category",
                    identifier: title.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::LedgerPaths;
    use crate::models::{BudgetLimit, Money, Month, Note};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_appends_and_rejects_duplicates() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let a = service.create("Travel", Some("#ff0000"), None).unwrap();
        let b = service.create("Food", None, Some("")).unwrap();
        assert!(b.sort_order > a.sort_order);
        assert_eq!(a.color.as_deref(), Some("#ff0000"));
        assert!(b.icon.is_none());

        let err = service.create("  travel ", None, None).unwrap_err();
        assert!(matches!(err, LedgerError::Duplicate { .. }));
        assert!(service.create("   ", None, None).unwrap_err().is_validation());
    }

    #[test]
    fn test_update_and_clear_fields() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let cat = service.create("Travel", Some("blue"), None).unwrap();

        let updated = service
            .update(
                cat.id,
                CategoryUpdate {
                    title: Some("Trips"),
                    color: Some(""),
                    icon: Some("plane"),
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Trips");
        assert!(updated.color.is_none());
        assert_eq!(updated.icon.as_deref(), Some("plane"));
        assert!(service.find("trips").unwrap().is_some());
    }

    #[test]
    fn test_reorder() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let a = service.create("A", None, None).unwrap();
        service.create("B", None, None).unwrap();
        let c = service.create("C", None, None).unwrap();

        service.reorder(&[c.id, a.id]).unwrap();

        let titles: Vec<_> = service.list().unwrap().into_iter().map(|c| c.title).collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
        assert!(service.reorder(&[CategoryId::new()]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_rules() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let default = service.ensure_default().unwrap();
        let travel = service.create("Travel", None, None).unwrap();
        let food = service.create("Food", None, None).unwrap();

        assert!(service.delete(default.id).unwrap_err().is_validation());

        storage
            .notes
            .upsert(Note::new("Trip plan", "", travel.id))
            .unwrap();
        assert!(service.delete(travel.id).unwrap_err().is_validation());

        storage
            .limits
            .upsert(BudgetLimit::new(food.id, Month::current(), Money::from_cents(100)))
            .unwrap();
        service.delete(food.id).unwrap();
        assert!(storage.limits.get_by_category(food.id).unwrap().is_empty());
        assert!(service.get(food.id).unwrap().is_none());
    }

    #[test]
    fn test_ensure_default_is_idempotent() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let first = service.ensure_default().unwrap();
        let second = service.ensure_default().unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_default);
        assert_eq!(service.list().unwrap().len(), 1);
    }
}
