//! Storage module for persistent data storage
//!
//! Provides SQLite-based persistence for extracted medical reports.

mod database;

pub use database::{ReportStore, REPORTS_TABLE};
