//! Calendar month representation
//!
//! Budget summaries and limits are keyed by calendar month, written as
//! `YYYY-MM`.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month (e.g. "2025-01")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Create a month, returning None when `month` is outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// The month containing the given date
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current local month
    pub fn current() -> Self {
        Self::of(chrono::Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month (inclusive)
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The `count` months ending at (and including) this one, oldest first
    pub fn trailing(&self, count: usize) -> Vec<Month> {
        let mut months = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            months.push(current);
            current = current.prev();
        }
        months.reverse();
        months
    }

    /// Long display form, e.g. "January 2025"
    pub fn long_name(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error returned when a month string is not `YYYY-MM`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthParseError(pub String);

impl fmt::Display for MonthParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid month '{}': expected YYYY-MM", self.0)
    }
}

impl std::error::Error for MonthParseError {}

impl FromStr for Month {
    type Err = MonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthParseError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Month::new(year, month).ok_or_else(err)
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let m: Month = "2025-03".parse().unwrap();
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 3);
        assert_eq!(m.to_string(), "2025-03");
        assert!("2025-13".parse::<Month>().is_err());
        assert!("2025-3".parse::<Month>().is_err());
        assert!("March".parse::<Month>().is_err());
    }

    #[test]
    fn test_boundaries() {
        let feb: Month = "2024-02".parse().unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(feb.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!feb.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[test]
    fn test_next_prev_wrap_year() {
        let dec: Month = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
        assert_eq!(dec.next().prev(), dec);
    }

    #[test]
    fn test_trailing() {
        let m: Month = "2025-02".parse().unwrap();
        let months: Vec<String> = m.trailing(3).iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-12", "2025-01", "2025-02"]);
    }

    #[test]
    fn test_serde_as_string() {
        let m: Month = "2025-07".parse().unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"2025-07\"");
        let back: Month = serde_json::from_str("\"2025-07\"").unwrap();
        assert_eq!(back, m);
    }
}
