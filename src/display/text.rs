//! Small text helpers shared by the formatters

use crate::models::Money;

/// Format a percentage with precision that shrinks as the value grows
pub fn format_percentage(pct: f64) -> String {
    if pct > 0.0 && pct < 0.1 {
        format!("{:.2}%", pct)
    } else if pct < 10.0 {
        format!("{:.1}%", pct)
    } else {
        format!("{:.0}%", pct)
    }
}

/// A fixed-width bar filled in proportion to `value / max_value`
pub fn format_bar(value: f64, max_value: f64, width: usize) -> String {
    if max_value <= 0.0 || value <= 0.0 {
        return "░".repeat(width);
    }

    let filled = ((value / max_value) * width as f64).round() as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Truncate to `max_chars` characters, ending in "..." when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        ".".repeat(max_chars)
    } else {
        let kept: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", kept)
    }
}

/// First line of a multi-line text
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

pub fn money(amount: Money, symbol: &str) -> String {
    amount.format_with_symbol(symbol)
}

pub fn separator(width: usize) -> String {
    "─".repeat(width)
}
