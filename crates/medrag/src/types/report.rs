//! Persisted report records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded report and its extracted text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Row ID, increasing with creation order
    pub id: i64,
    /// Original filename
    pub filename: String,
    /// Extracted text (never empty)
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}
