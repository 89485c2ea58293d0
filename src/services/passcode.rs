//! Passcode service
//!
//! A 4-digit lock stored as an Argon2id PHC string (random salt) under the
//! `passcode` preference.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde_json::json;
use tracing::info;

use crate::audit::EntityType;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::{Storage, PASSCODE_KEY};

pub const PASSCODE_LEN: usize = 4;

/// Check the passcode format: exactly four ASCII digits
pub fn validate_format(passcode: &str) -> LedgerResult<()> {
    if passcode.len() == PASSCODE_LEN && passcode.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(LedgerError::Passcode(format!(
            "Passcode must be exactly {} digits",
            PASSCODE_LEN
        )))
    }
}

fn hash(passcode: &str) -> LedgerResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(passcode.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| LedgerError::Passcode(format!("Failed to hash passcode: {}", e)))
}

/// Service for the app passcode
pub struct PasscodeService<'a> {
    storage: &'a Storage,
}

impl<'a> PasscodeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn is_set(&self) -> LedgerResult<bool> {
        self.storage.preferences.contains(PASSCODE_KEY)
    }

    /// Set the first passcode; an existing one must be changed instead
    pub fn set(&self, passcode: &str, confirm: &str) -> LedgerResult<()> {
        if self.is_set()? {
            return Err(LedgerError::Passcode(
                "A passcode is already set; use change instead".into(),
            ));
        }
        self.store(passcode, confirm)?;
        self.storage
            .log_create(EntityType::Preference, PASSCODE_KEY, None, &json!({"key": PASSCODE_KEY}))?;
        info!("passcode set");
        Ok(())
    }

    /// Check `input` against the stored passcode; false when none is set
    pub fn verify(&self, input: &str) -> LedgerResult<bool> {
        let Some(stored) = self.storage.preferences.get(PASSCODE_KEY)? else {
            return Ok(false);
        };
        if validate_format(input).is_err() {
            return Ok(false);
        }

        let parsed = PasswordHash::new(&stored)
            .map_err(|e| LedgerError::Passcode(format!("Stored passcode hash is corrupt: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(input.as_bytes(), &parsed)
            .is_ok())
    }

    pub fn change(&self, current: &str, new: &str, confirm: &str) -> LedgerResult<()> {
        self.require_current(current)?;
        self.store(new, confirm)?;
        self.storage.log_update(
            EntityType::Preference,
            PASSCODE_KEY,
            None,
            &json!({"key": PASSCODE_KEY}),
            &json!({"key": PASSCODE_KEY, "changed": true}),
        )?;
        info!("passcode changed");
        Ok(())
    }

    /// Remove the passcode after checking the current one
    pub fn clear(&self, current: &str) -> LedgerResult<()> {
        self.require_current(current)?;
        self.storage.preferences.remove(PASSCODE_KEY)?;
        self.storage.preferences.save()?;
        self.storage
            .log_delete(EntityType::Preference, PASSCODE_KEY, None, &json!({"key": PASSCODE_KEY}))?;
        info!("passcode cleared");
        Ok(())
    }

    fn require_current(&self, current: &str) -> LedgerResult<()> {
        if !self.is_set()? {
            return Err(LedgerError::Passcode("No passcode is set".into()));
        }
        if !self.verify(current)? {
            return Err(LedgerError::Passcode("Current passcode is incorrect".into()));
        }
        Ok(())
    }

    fn store(&self, passcode: &str, confirm: &str) -> LedgerResult<()> {
        validate_format(passcode)?;
        if passcode != confirm {
            return Err(LedgerError::Passcode("Passcodes do not match".into()));
        }
        self.storage.preferences.set(PASSCODE_KEY, hash(passcode)?)?;
        self.storage.preferences.save()
    }
}
