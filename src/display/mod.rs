//! Display formatting for terminal output
//!
//! Every formatter returns a `String`; the CLI decides where it goes.

pub mod archive;
pub mod budget;
pub mod category;
pub mod limit;
pub mod note;
pub mod text;

pub use archive::format_archive_list;
pub use budget::{
    format_breakdown, format_entry_details, format_entry_list, format_entry_row,
    format_monthly_summary, format_recurrence_run, format_trend,
};
pub use category::{format_category_details, format_category_list};
pub use limit::{format_limit_list, format_limit_status};
pub use note::{format_note_details, format_note_line, format_note_list};
