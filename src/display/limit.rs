//! Budget limit formatting

use std::collections::HashMap;

use crate::models::{BudgetLimit, CategoryId};

use super::text::{format_bar, format_percentage, money, truncate};

/// Format limits with a usage bar; `categories` maps ids to titles
pub fn format_limit_list(
    limits: &[BudgetLimit],
    categories: &HashMap<CategoryId, String>,
    symbol: &str,
) -> String {
    if limits.is_empty() {
        return "No budget limits found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:7}  {:<12}  {:<16}  {:>11}  {:>11}  {:>6}  {}\n",
        "Month", "ID", "Category", "Limit", "Spent", "Used", ""
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for limit in limits {
        let category = categories
            .get(&limit.category_id)
            .map(String::as_str)
            .unwrap_or("?");
        let status = if !limit.is_active {
            " (inactive)"
        } else if limit.is_over() {
            " OVER"
        } else {
            ""
        };
        output.push_str(&format!(
            "{:7}  {:<12}  {:<16}  {:>11}  {:>11}  {:>6}  {}{}\n",
            limit.month.to_string(),
            limit.id.to_string(),
            truncate(category, 16),
            money(limit.limit, symbol),
            money(limit.spent, symbol),
            format_percentage(limit.percent_used()),
            format_bar(limit.percent_used(), 100.0, 10),
            status
        ));
    }

    output
}

/// One-line status of a limit after set/recompute
pub fn format_limit_status(limit: &BudgetLimit, category: &str, symbol: &str) -> String {
    let remaining = limit.remaining();
    if remaining.is_negative() {
        format!(
            "{} {}: {} of {} spent, over by {}",
            category,
            limit.month,
            money(limit.spent, symbol),
            money(limit.limit, symbol),
            money(-remaining, symbol)
        )
    } else {
        format!(
            "{} {}: {} of {} spent, {} left",
            category,
            limit.month,
            money(limit.spent, symbol),
            money(limit.limit, symbol),
            money(remaining, symbol)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, Month};

    fn limit(cents: i64, spent: i64) -> BudgetLimit {
        let mut l = BudgetLimit::new(CategoryId::new(), Month::new(2025, 6).unwrap(), Money::from_cents(cents));
        l.spent = Money::from_cents(spent);
        l
    }

    #[test]
    fn test_format_list_flags_over() {
        let over = limit(10000, 15000);
        let titles = HashMap::from([(over.category_id, "Food".to_string())]);

        let output = format_limit_list(&[over], &titles, "$");
        assert!(output.contains("Food"));
        assert!(output.contains("OVER"));
        assert!(output.contains("150%"));
    }

    #[test]
    fn test_format_status() {
        assert_eq!(
            format_limit_status(&limit(10000, 2500), "Food", "$"),
            "Food 2025-06: $25.00 of $100.00 spent, $75.00 left"
        );
        assert!(format_limit_status(&limit(10000, 10100), "Food", "$").ends_with("over by $1.00"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(format_limit_list(&[], &HashMap::new(), "$"), "No budget limits found.");
    }
}
