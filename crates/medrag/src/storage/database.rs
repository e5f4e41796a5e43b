//! SQLite database for extracted report text

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::types::Report;

/// Table holding one row per successful upload
pub const REPORTS_TABLE: &str = "medical_reports";

/// SQLite-based report store
///
/// Reports are append-only: there is no update or delete.
#[derive(Clone)]
pub struct ReportStore {
    conn: Arc<Mutex<Connection>>,
}

impl ReportStore {
    /// Open the database named by a connection string
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        let path = config.sqlite_path()?;

        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(&path)
        }
        .map_err(|e| Error::storage(format!("Failed to open database {}: {}", path, e)))?;

        tracing::info!("Opened report database at {}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database without any tables
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::storage(format!("Failed to open in-memory database: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the reports table if it does not exist
    pub fn init(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS medical_reports (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_medical_reports_created_at ON medical_reports(created_at);
            "#,
        )
        .map_err(|e| Error::storage(format!("Failed to create tables: {}", e)))?;

        tracing::info!("Database tables ready");
        Ok(())
    }

    /// Whether a table exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Persist a new report and return it with its assigned id
    pub fn save(&self, filename: &str, content: &str) -> Result<Report> {
        if content.trim().is_empty() {
            return Err(Error::storage(format!(
                "Refusing to save report '{}' with empty content",
                filename
            )));
        }

        let created_at = Utc::now();
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO medical_reports (filename, content, created_at) VALUES (?1, ?2, ?3)",
            params![filename, content, created_at.to_rfc3339()],
        )
        .map_err(|e| Error::storage(format!("Failed to save report '{}': {}", filename, e)))?;

        let report = Report {
            id: conn.last_insert_rowid(),
            filename: filename.to_string(),
            content: content.to_string(),
            created_at,
        };

        tracing::info!(
            "Saved report {} ({}, {} characters)",
            report.id,
            report.filename,
            report.content.len()
        );

        Ok(report)
    }

    /// The report with the highest id, if any
    pub fn latest(&self) -> Result<Option<Report>> {
        let conn = self.conn.lock();

        let report = conn
            .query_row(
                "SELECT id, filename, content, created_at FROM medical_reports ORDER BY id DESC LIMIT 1",
                [],
                row_to_report,
            )
            .optional()?;

        Ok(report)
    }

    /// Get a report by id
    pub fn get(&self, id: i64) -> Result<Option<Report>> {
        let conn = self.conn.lock();

        let report = conn
            .query_row(
                "SELECT id, filename, content, created_at FROM medical_reports WHERE id = ?1",
                params![id],
                row_to_report,
            )
            .optional()?;

        Ok(report)
    }

    /// Number of stored reports
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM medical_reports", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn row_to_report(row: &rusqlite::Row) -> rusqlite::Result<Report> {
    let created_at_str: String = row.get(3)?;

    Ok(Report {
        id: row.get(0)?,
        filename: row.get(1)?,
        content: row.get(2)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
            })?,
    })
}
