//! CLI command handlers

pub mod commands;

pub use commands::{convert, export_names, WorkbookSource};
