//! Audit trail for LedgerNote
//!
//! Every mutation of notes, categories, budget entries, limits, archives and
//! preferences is appended to `audit.log` as one JSON object per line, with
//! the record's state before and after the change.

mod diff;
mod entry;
mod logger;

pub use diff::summarize_changes;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
