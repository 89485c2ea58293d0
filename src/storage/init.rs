//! Storage initialization
//!
//! First-run setup: directories plus the default category.

use tracing::info;

use crate::config::paths::LedgerPaths;
use crate::error::LedgerError;
use crate::models::Category;

use super::categories::CategoryRepository;

/// Prepare the data directory and make sure a default category exists
///
/// Safe to run repeatedly. Returns true when the default category was created.
pub fn initialize_storage(paths: &LedgerPaths) -> Result<bool, LedgerError> {
    paths.ensure_directories()?;

    let categories = CategoryRepository::new(paths.categories_file());
    categories.load()?;

    if categories.get_default()?.is_some() {
        return Ok(false);
    }

    let mut default = Category::default_category();
    // Keep it ahead of anything created before the default went missing
    default.sort_order = categories
        .get_all()?
        .iter()
        .map(|c| c.sort_order)
        .min()
        .map_or(0, |min| min.min(1) - 1);
    categories.upsert(default)?;
    categories.save()?;

    info!("created default category");
    Ok(true)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &LedgerPaths) -> bool {
    !paths.categories_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_default_category_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        assert!(initialize_storage(&paths).unwrap());
        assert!(!needs_initialization(&paths));
        assert!(!initialize_storage(&paths).unwrap());

        let repo = CategoryRepository::new(paths.categories_file());
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 1);
        let default = repo.get_default().unwrap().unwrap();
        assert_eq!(default.title, crate::models::DEFAULT_CATEGORY_TITLE);
    }
}
