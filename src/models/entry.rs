//! Budget entry model
//!
//! An income or expense recorded against a budget note. An entry with a
//! recurrence is a template; generated occurrences point back to it through
//! `generated_from` and never carry a recurrence of their own.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{EntryId, NoteId};
use super::money::Money;
use super::recurrence::Recurrence;

/// Whether an entry adds to or subtracts from the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "out" => Ok(Self::Expense),
            other => Err(format!(
                "Unknown entry type '{}': expected income or expense",
                other
            )),
        }
    }
}

/// A dated income/expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: EntryId,

    /// The budget note this entry belongs to
    pub note_id: NoteId,

    pub date: NaiveDate,

    pub description: String,

    pub entry_type: EntryType,

    /// Always positive; `entry_type` carries the direction
    pub amount: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,

    /// Present on recurring templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,

    /// The template this occurrence was generated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_from: Option<EntryId>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl BudgetEntry {
    /// Create a new one-off entry
    pub fn new(
        note_id: NoteId,
        date: NaiveDate,
        description: impl Into<String>,
        entry_type: EntryType,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            note_id,
            date,
            description: description.into(),
            entry_type,
            amount,
            sub_category: None,
            recurrence: None,
            generated_from: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_template(&self) -> bool {
        self.recurrence.is_some()
    }

    pub fn is_expense(&self) -> bool {
        self.entry_type == EntryType::Expense
    }

    /// Amount with sign applied (expenses negative)
    pub fn signed_amount(&self) -> Money {
        match self.entry_type {
            EntryType::Income => self.amount,
            EntryType::Expense => -self.amount,
        }
    }

    /// Build the occurrence of this template that falls on `date`
    pub fn occurrence(&self, date: NaiveDate) -> BudgetEntry {
        let now = Utc::now();
        BudgetEntry {
            id: EntryId::new(),
            note_id: self.note_id,
            date,
            description: self.description.clone(),
            entry_type: self.entry_type,
            amount: self.amount,
            sub_category: self.sub_category.clone(),
            recurrence: None,
            generated_from: Some(self.id),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate the entry
    pub fn validate(&self) -> Result<(), EntryValidationError> {
        if self.description.trim().is_empty() {
            return Err(EntryValidationError::EmptyDescription);
        }

        if !self.amount.is_positive() {
            return Err(EntryValidationError::NonPositiveAmount(self.amount));
        }

        if !self.amount.is_within_max() {
            return Err(EntryValidationError::AmountTooLarge(self.amount));
        }

        if self.recurrence.is_some() && self.generated_from.is_some() {
            return Err(EntryValidationError::RecurringOccurrence);
        }

        if let Some(sub) = &self.sub_category {
            if sub.trim().is_empty() {
                return Err(EntryValidationError::EmptySubCategory);
            }
        }

        Ok(())
    }
}

/// Validation errors for budget entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    EmptyDescription,
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    RecurringOccurrence,
    EmptySubCategory,
}

impl fmt::Display for EntryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "Entry description cannot be empty"),
            Self::NonPositiveAmount(amount) => {
                write!(f, "Entry amount must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Entry amount {} exceeds the maximum of {}", amount, Money::MAX)
            }
            Self::RecurringOccurrence => {
                write!(f, "A generated occurrence cannot itself recur")
            }
            Self::EmptySubCategory => write!(f, "Sub-category cannot be blank"),
        }
    }
}

impl std::error::Error for EntryValidationError {}
