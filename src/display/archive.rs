//! Archive listing

use crate::models::Archive;

use super::text::truncate;

pub fn format_archive_list(archives: &[Archive]) -> String {
    if archives.is_empty() {
        return "Archive is empty.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:6}  {:16}  {}\n",
        "ID", "Kind", "Deleted", "Record"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for archive in archives {
        output.push_str(&format!(
            "{:<12}  {:6}  {:16}  {}\n",
            archive.id.to_string(),
            archive.kind.to_string(),
            archive.deleted_at.format("%Y-%m-%d %H:%M"),
            truncate(&archive.label(), 40)
        ));
    }

    output
}
