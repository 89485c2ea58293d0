//! Field-level change summaries for update entries

use serde_json::Value;

/// Bookkeeping fields that change on every update and would only add noise
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_SHOWN_CHARS: usize = 40;

/// Summarise top-level field changes between two JSON objects,
/// e.g. `title: "Rent" -> "Rent (flat)", amount: 90000 -> 95000`
///
/// Returns `None` when nothing visible changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let changes: Vec<String> = match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            let mut keys: Vec<&String> = old.keys().chain(new.keys()).collect();
            keys.sort();
            keys.dedup();

            keys.into_iter()
                .filter(|k| !IGNORED_FIELDS.contains(&k.as_str()))
                .filter_map(|k| match (old.get(k), new.get(k)) {
                    (Some(a), Some(b)) if a == b => None,
                    (Some(a), Some(b)) => Some(format!("{}: {} -> {}", k, short(a), short(b))),
                    (Some(a), None) => Some(format!("{}: {} -> (removed)", k, short(a))),
                    (None, Some(b)) => Some(format!("{}: (added) -> {}", k, short(b))),
                    (None, None) => None,
                })
                .collect()
        }
        _ if before != after => vec![format!("{} -> {}", short(before), short(after))],
        _ => Vec::new(),
    };

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn short(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_SHOWN_CHARS => {
            let head: String = s.chars().take(MAX_SHOWN_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_added_removed() {
        let before = json!({"title": "Rent", "is_pinned": false, "voice_path": "memo.m4a"});
        let after = json!({"title": "Rent (flat)", "is_pinned": false, "color": "red"});

        let summary = summarize_changes(&before, &after).unwrap();
        assert_eq!(
            summary,
            "color: (added) -> \"red\", title: \"Rent\" -> \"Rent (flat)\", voice_path: \"memo.m4a\" -> (removed)"
        );
    }

    #[test]
    fn test_timestamp_only_change_is_silent() {
        let before = json!({"title": "A", "updated_at": "2025-01-01T00:00:00Z"});
        let after = json!({"title": "A", "updated_at": "2025-02-01T00:00:00Z"});
        assert!(summarize_changes(&before, &after).is_none());
    }

    #[test]
    fn test_long_strings_truncated_on_char_boundary() {
        let before = json!({"content": "é".repeat(60)});
        let after = json!({"content": ""});
        let summary = summarize_changes(&before, &after).unwrap();
        assert!(summary.contains("...\""));
    }

    #[test]
    fn test_scalar_values() {
        assert_eq!(
            summarize_changes(&json!(1), &json!(2)).as_deref(),
            Some("1 -> 2")
        );
        assert!(summarize_changes(&json!("x"), &json!("x")).is_none());
    }
}
