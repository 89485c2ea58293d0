//! Recurrence rules for budget entries
//!
//! A recurring entry is a template: its occurrences are computed from the
//! template's anchor date as `anchor + k * period`, so month-end dates clamp
//! per occurrence instead of drifting (Jan 31 -> Feb 28 -> Mar 31).

use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often a recurring entry repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// The k-th occurrence after `anchor` (k = 0 is the anchor itself)
    pub fn nth(&self, anchor: NaiveDate, k: u32) -> Option<NaiveDate> {
        match self {
            Self::Weekly => anchor.checked_add_signed(Duration::weeks(i64::from(k))),
            Self::Monthly => anchor.checked_add_months(Months::new(k)),
            Self::Yearly => k
                .checked_mul(12)
                .and_then(|months| anchor.checked_add_months(Months::new(months))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" | "y" => Ok(Self::Yearly),
            other => Err(format!(
                "Unknown frequency '{}': expected weekly, monthly or yearly",
                other
            )),
        }
    }
}

/// Recurrence state carried by a template entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: Frequency,

    /// Date of the template itself; occurrence 0
    pub anchor: NaiveDate,

    /// Index of the next occurrence to generate
    pub step: u32,

    /// Date of the next occurrence to generate
    pub next_date: NaiveDate,

    /// Last date on which an occurrence may fall
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_on: Option<NaiveDate>,
}

impl Recurrence {
    /// Start a recurrence whose first generated occurrence is one period after `anchor`
    pub fn new(frequency: Frequency, anchor: NaiveDate, ends_on: Option<NaiveDate>) -> Self {
        Self {
            frequency,
            anchor,
            step: 1,
            next_date: frequency.nth(anchor, 1).unwrap_or(NaiveDate::MAX),
            ends_on,
        }
    }

    /// Whether no further occurrences will ever be generated
    pub fn is_finished(&self) -> bool {
        self.next_date == NaiveDate::MAX || self.ends_on.is_some_and(|end| self.next_date > end)
    }

    /// Whether the next occurrence falls on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        !self.is_finished() && self.next_date <= today
    }

    /// Move to the following occurrence
    pub fn advance(&mut self) {
        self.step = self.step.saturating_add(1);
        self.next_date = self
            .frequency
            .nth(self.anchor, self.step)
            .unwrap_or(NaiveDate::MAX);
    }

    /// Re-anchor after the template's date was edited
    ///
    /// Steps past `last_generated` so periods that already have an
    /// occurrence are not generated again under the new anchor.
    pub fn reanchor(&mut self, anchor: NaiveDate, last_generated: Option<NaiveDate>) {
        *self = Self::new(self.frequency, anchor, self.ends_on);
        if let Some(last) = last_generated {
            self.skip_through(last);
        }
    }

    /// Advance until the next occurrence falls after `date`
    pub fn skip_through(&mut self, date: NaiveDate) {
        while self.next_date <= date {
            self.advance();
        }
    }
}
