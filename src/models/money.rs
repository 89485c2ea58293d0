//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues when summing income and expenses. Single amounts are bounded by
//! [`Money::MAX`] and arithmetic saturates, so totals never wrap.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest accepted single amount: one trillion units
    pub const MAX: Money = Money(100_000_000_000_000);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use ledgernote::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "$10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Get the whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Get the cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Whether the magnitude is within [`Money::MAX`]
    pub const fn is_within_max(&self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0.unsigned_abs()
    }

    /// Amount as a floating point number of units, for CSV and percentages
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "10", "1,250.00"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let s = s.trim();

        let (negative, s) = match s.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, s),
        };

        let s = s.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let cents = match cleaned.split_once('.') {
            Some((whole, frac)) => {
                let whole: i64 = if whole.is_empty() {
                    0
                } else {
                    whole
                        .parse()
                        .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?
                };

                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(MoneyParseError::InvalidFormat(s.to_string()));
                }
                let frac_cents: i64 = match frac.len() {
                    0 => 0,
                    1 => frac.parse::<i64>().unwrap_or(0) * 10,
                    2 => frac.parse().unwrap_or(0),
                    _ => return Err(MoneyParseError::TooPrecise(s.to_string())),
                };

                whole
                    .checked_mul(100)
                    .and_then(|w| w.checked_add(frac_cents))
                    .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?
            }
            None => cleaned
                .parse::<i64>()
                .ok()
                .and_then(|w| w.checked_mul(100))
                .ok_or_else(|| MoneyParseError::InvalidFormat(s.to_string()))?,
        };

        let amount = Self(if negative { -cents } else { cents });
        if !amount.is_within_max() {
            return Err(MoneyParseError::TooLarge(s.to_string()));
        }
        Ok(amount)
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    TooPrecise(String),
    TooLarge(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::TooPrecise(s) => {
                write!(f, "Amount has more than two decimal places: {}", s)
            }
            MoneyParseError::TooLarge(s) => {
                write!(f, "Amount exceeds the maximum of {}: {}", Money::MAX, s)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}
