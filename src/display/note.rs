//! Note display formatting

use std::collections::HashMap;

use crate::models::{BudgetEntry, CategoryId, Note};

use super::budget::format_entry_list;
use super::text::{first_line, truncate};

const TITLE_WIDTH: usize = 30;
const CATEGORY_WIDTH: usize = 14;

fn flags(note: &Note) -> String {
    let mut flags = String::new();
    flags.push(if note.is_pinned { 'P' } else { ' ' });
    flags.push(if note.is_budget { '$' } else { ' ' });
    flags.push(if note.voice_path.is_some() { '♪' } else { ' ' });
    flags
}

/// Format notes as a table; `categories` maps ids to titles
pub fn format_note_list(notes: &[Note], categories: &HashMap<CategoryId, String>) -> String {
    if notes.is_empty() {
        return "No notes found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:3}  {:<12}  {:<tw$}  {:<cw$}  {}\n",
        "",
        "ID",
        "Title",
        "Category",
        "Updated",
        tw = TITLE_WIDTH,
        cw = CATEGORY_WIDTH
    ));
    output.push_str(&"-".repeat(3 + 2 + 12 + 2 + TITLE_WIDTH + 2 + CATEGORY_WIDTH + 2 + 10));
    output.push('\n');

    for note in notes {
        let category = categories
            .get(&note.category_id)
            .map(String::as_str)
            .unwrap_or("?");
        output.push_str(&format!(
            "{:3}  {:<12}  {:<tw$}  {:<cw$}  {}\n",
            flags(note),
            note.id.to_string(),
            truncate(&note.title, TITLE_WIDTH),
            truncate(category, CATEGORY_WIDTH),
            note.updated_at.format("%Y-%m-%d"),
            tw = TITLE_WIDTH,
            cw = CATEGORY_WIDTH
        ));
    }

    output.push_str(&format!("\n{} note(s)\n", notes.len()));
    output
}

/// Format a note with its content and, for budget notes, its entries
pub fn format_note_details(
    note: &Note,
    category_title: Option<&str>,
    entries: &[BudgetEntry],
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Note: {}\n", note.title));
    output.push_str(&format!("  ID:       {}\n", note.id));
    output.push_str(&format!(
        "  Category: {}\n",
        category_title.unwrap_or("(missing)")
    ));
    if note.is_pinned {
        output.push_str("  Pinned:   Yes\n");
    }
    if let Some(path) = &note.voice_path {
        output.push_str(&format!("  Voice:    {}\n", path.display()));
    }
    output.push_str(&format!(
        "  Created:  {}\n",
        note.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.push_str(&format!(
        "  Modified: {}\n",
        note.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if !note.content.is_empty() {
        output.push('\n');
        for line in note.content.lines() {
            output.push_str(&format!("  {}\n", line));
        }
    }

    if note.is_budget {
        output.push_str("\nEntries:\n");
        output.push_str(&format_entry_list(entries, symbol));
    }

    output
}

/// One-line preview used after create/update
pub fn format_note_line(note: &Note) -> String {
    let preview = first_line(&note.content);
    if preview.is_empty() {
        format!("{} {}", note.id, note.title)
    } else {
        format!("{} {}: {}", note.id, note.title, truncate(preview, 40))
    }
}
