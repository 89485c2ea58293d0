//! Core data models for LedgerNote
//!
//! This module contains the data structures of the notes-and-budget domain:
//! notes, categories, budget entries with recurrence, monthly budget limits,
//! and archive snapshots of deleted records.

pub mod archive;
pub mod category;
pub mod entry;
pub mod ids;
pub mod limit;
pub mod money;
pub mod month;
pub mod note;
pub mod recurrence;

pub use archive::{Archive, ArchiveKind, NoteSnapshot};
pub use category::{Category, DEFAULT_CATEGORY_TITLE};
pub use entry::{BudgetEntry, EntryType};
pub use ids::{ArchiveId, CategoryId, EntryId, LimitId, NoteId};
pub use limit::BudgetLimit;
pub use money::Money;
pub use month::Month;
pub use note::Note;
pub use recurrence::{Frequency, Recurrence};
