//! Service layer for LedgerNote
//!
//! Business rules on top of the storage layer: validation, cascades into the
//! archive, recurring rollover and budget limit recomputation.

pub mod archive;
pub mod budget;
pub mod category;
pub mod import;
pub mod limit;
pub mod note;
pub mod passcode;
pub mod recurrence;
pub mod theme;

pub use archive::{ArchiveService, Restored};
pub use budget::{BreakdownRow, BudgetService, EntryUpdate, MonthlySummary, NewEntry};
pub use category::{CategoryService, CategoryUpdate};
pub use import::{ImportResult, ImportService, KindCount};
pub use limit::LimitService;
pub use note::{NewNote, NoteFilter, NoteService, NoteUpdate};
pub use passcode::PasscodeService;
pub use recurrence::{RecurrenceRun, RecurrenceService};
pub use theme::{Theme, ThemeService};
