//! Theme preference
//!
//! Stored in the preference store so it travels with exports.

use std::fmt;
use std::str::FromStr;

use serde_json::json;

use crate::audit::EntityType;
use crate::error::LedgerResult;
use crate::storage::{Storage, THEME_KEY};

/// Display theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
            Self::System => write!(f, "system"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            other => Err(format!("Unknown theme '{}': expected light, dark or system", other)),
        }
    }
}

pub struct ThemeService<'a> {
    storage: &'a Storage,
}

impl<'a> ThemeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// The stored theme; unset or unreadable values mean `System`
    pub fn get(&self) -> LedgerResult<Theme> {
        Ok(self
            .storage
            .preferences
            .get(THEME_KEY)?
            .and_then(|v| v.parse().ok())
            .unwrap_or_default())
    }

    pub fn set(&self, theme: Theme) -> LedgerResult<Theme> {
        let previous = self.storage.preferences.set(THEME_KEY, theme.to_string())?;
        self.storage.preferences.save()?;

        let after = json!({ "key": THEME_KEY, "value": theme.to_string() });
        match previous {
            Some(before) => self.storage.log_update(
                EntityType::Preference,
                THEME_KEY,
                None,
                &json!({ "key": THEME_KEY, "value": before }),
                &after,
            )?,
            None => self
                .storage
                .log_create(EntityType::Preference, THEME_KEY, None, &after)?,
        }

        Ok(theme)
    }
}
