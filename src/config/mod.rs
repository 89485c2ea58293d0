//! Configuration module for LedgerNote
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Application settings persistence

pub mod paths;
pub mod settings;

pub use paths::LedgerPaths;
pub use settings::Settings;
