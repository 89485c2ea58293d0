//! LedgerNote - terminal notes and budget tracker
//!
//! Notes tagged with categories, income/expense entries recorded against
//! budget notes, recurring entries generated on schedule, per-category
//! monthly limits, and a soft-delete archive from which any deleted note or
//! entry can be restored. Data lives in JSON files and can be exported,
//! imported and backed up as a whole; a 4-digit passcode can lock it.
//!
//! # Architecture
//!
//! - `config`: path resolution and settings
//! - `error`: the crate error type
//! - `models`: notes, categories, entries, limits, archives
//! - `storage`: JSON repositories with atomic writes
//! - `services`: business rules (cascades, rollover, limit recomputation)
//! - `audit`: append-only change log
//! - `export`: JSON, YAML and CSV export
//! - `backup`: timestamped backups with retention
//! - `cli` / `display`: command handlers and text formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgernote::config::paths::LedgerPaths;
//! use ledgernote::services::{NewNote, NoteService};
//! use ledgernote::storage::Storage;
//!
//! let mut storage = Storage::new(LedgerPaths::new()?)?;
//! storage.load_all()?;
//! let note = NoteService::new(&storage).create(NewNote {
//!     title: "Groceries".into(),
//!     ..Default::default()
//! })?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
