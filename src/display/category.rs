//! Category display formatting

use crate::models::Category;

/// Format categories with their note counts as a table
pub fn format_category_list(categories: &[(Category, usize)]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'ledgernote init' to create the default category."
            .to_string();
    }

    let title_width = categories
        .iter()
        .map(|(c, _)| c.title.chars().count())
        .max()
        .unwrap_or(5)
        .max(5);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<width$}  {:>5}  {:<12}  {}\n",
        "Title",
        "Notes",
        "ID",
        "Style",
        width = title_width
    ));
    output.push_str(&format!(
        "{:-<width$}  {:->5}  {:-<12}  {:-<10}\n",
        "",
        "",
        "",
        "",
        width = title_width
    ));

    for (category, count) in categories {
        let default_marker = if category.is_default { " *" } else { "" };
        output.push_str(&format!(
            "{:<width$}  {:>5}  {:<12}  {}{}\n",
            category.title,
            count,
            category.id.to_string(),
            format_style(category),
            default_marker,
            width = title_width
        ));
    }

    if categories.iter().any(|(c, _)| c.is_default) {
        output.push_str("\n* default category\n");
    }

    output
}

fn format_style(category: &Category) -> String {
    match (&category.color, &category.icon) {
        (Some(color), Some(icon)) => format!("{} {}", color, icon),
        (Some(color), None) => color.clone(),
        (None, Some(icon)) => icon.clone(),
        (None, None) => "-".to_string(),
    }
}

/// Format category details
pub fn format_category_details(category: &Category, note_count: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.title));
    output.push_str(&format!("  ID:         {}\n", category.id));
    output.push_str(&format!(
        "  Default:    {}\n",
        if category.is_default { "Yes" } else { "No" }
    ));
    output.push_str(&format!("  Sort Order: {}\n", category.sort_order));
    if let Some(color) = &category.color {
        output.push_str(&format!("  Color:      {}\n", color));
    }
    if let Some(icon) = &category.icon {
        output.push_str(&format!("  Icon:       {}\n", icon));
    }
    output.push_str(&format!("  Notes:      {}\n", note_count));

    output.push('\n');
    output.push_str(&format!(
        "  Created:  {}\n",
        category.created_at.format("%Y-%m-%d %H:%M UTC")
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_empty_list() {
        let output = format_category_list(&[]);
        assert!(output.contains("No categories found"));
    }

    #[test]
    fn test_format_list_marks_default() {
        let budget = Category::default_category();
        let mut ideas = Category::new("Ideas");
        ideas.color = Some("#FF6200EE".into());

        let output = format_category_list(&[(budget, 2), (ideas, 0)]);
        assert!(output.contains("Budget"));
        assert!(output.contains("Ideas"));
        assert!(output.contains("#FF6200EE"));
        assert!(output.contains("* default category"));
    }

    #[test]
    fn test_format_details() {
        let mut category = Category::new("Travel");
        category.icon = Some("plane".into());

        let output = format_category_details(&category, 3);
        assert!(output.contains("Category: Travel"));
        assert!(output.contains("Icon:       plane"));
        assert!(output.contains("Notes:      3"));
        assert!(!output.contains("Color:"));
    }
}
