//! Budget limit model
//!
//! A spending ceiling for one category in one month. `spent` is derived data,
//! recomputed from the month's expense entries whenever they change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, LimitId};
use super::money::Money;
use super::month::Month;

/// A per-category, per-month spending ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub id: LimitId,

    pub category_id: CategoryId,

    pub month: Month,

    pub limit: Money,

    /// Total expenses attributed to the category during `month`
    #[serde(default)]
    pub spent: Money,

    #[serde(default = "default_active")]
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl BudgetLimit {
    /// Create a new, active limit with nothing spent
    pub fn new(category_id: CategoryId, month: Month, limit: Money) -> Self {
        let now = Utc::now();
        Self {
            id: LimitId::new(),
            category_id,
            month,
            limit,
            spent: Money::zero(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_over(&self) -> bool {
        self.spent > self.limit
    }

    /// Amount left before the limit is reached (negative when over)
    pub fn remaining(&self) -> Money {
        self.limit - self.spent
    }

    /// Percentage of the limit used so far
    pub fn percent_used(&self) -> f64 {
        if self.limit.is_zero() {
            if self.spent.is_zero() {
                0.0
            } else {
                100.0
            }
        } else {
            self.spent.cents() as f64 / self.limit.cents() as f64 * 100.0
        }
    }

    /// Set the spent total; returns true if it changed
    pub fn set_spent(&mut self, spent: Money) -> bool {
        if self.spent == spent {
            return false;
        }
        self.spent = spent;
        self.updated_at = Utc::now();
        true
    }

    pub fn validate(&self) -> Result<(), LimitValidationError> {
        if self.limit.is_negative() {
            return Err(LimitValidationError::NegativeLimit(self.limit));
        }
        if !self.limit.is_within_max() {
            return Err(LimitValidationError::TooLarge(self.limit));
        }
        Ok(())
    }
}

/// Validation errors for budget limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitValidationError {
    NegativeLimit(Money),
    TooLarge(Money),
}

impl fmt::Display for LimitValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeLimit(m) => write!(f, "Budget limit cannot be negative (got {})", m),
            Self::TooLarge(m) => write!(f, "Budget limit {} exceeds the maximum of {}", m, Money::MAX),
        }
    }
}

impl std::error::Error for LimitValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(limit: i64, spent: i64) -> BudgetLimit {
        let mut l = BudgetLimit::new(CategoryId::new(), "2025-01".parse().unwrap(), Money::from_cents(limit));
        l.spent = Money::from_cents(spent);
        l
    }

    #[test]
    fn test_over_and_remaining() {
        let under = limit(10000, 2500);
        assert!(!under.is_over());
        assert_eq!(under.remaining().cents(), 7500);
        assert_eq!(under.percent_used(), 25.0);

        let over = limit(10000, 12000);
        assert!(over.is_over());
        assert_eq!(over.remaining().cents(), -2000);

        let exact = limit(10000, 10000);
        assert!(!exact.is_over());
    }

    #[test]
    fn test_zero_limit_percent() {
        assert_eq!(limit(0, 0).percent_used(), 0.0);
        assert_eq!(limit(0, 1).percent_used(), 100.0);
    }

    #[test]
    fn test_set_spent_reports_change() {
        let mut l = limit(10000, 0);
        assert!(l.set_spent(Money::from_cents(500)));
        assert!(!l.set_spent(Money::from_cents(500)));
    }

    #[test]
    fn test_negative_limit_rejected() {
        let l = limit(-1, 0);
        assert!(l.validate().is_err());

        let huge = limit(Money::MAX.cents() + 1, 0);
        assert!(matches!(huge.validate(), Err(LimitValidationError::TooLarge(_))));
    }
}
