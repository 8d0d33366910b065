//! Database layer for ecoflow-reports
//!
//! Handles SQLite persistence of saved report records.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`reports`] - Saved report CRUD

use crate::error::PersistenceError;
use crate::types::{ReportId, ReportKind, ReportPayload};
use chrono::{DateTime, TimeZone, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod reports;

/// Report record row from database
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ReportRow {
    /// Unique database ID
    pub id: i64,
    /// Report kind ("analytics" or "esg")
    pub kind: String,
    /// Report title
    pub title: String,
    /// JSON-encoded [`ReportPayload`]
    pub payload: String,
    /// Unix timestamp of model construction
    pub generated_at: i64,
    /// Unix timestamp of the save
    pub saved_at: i64,
}

/// A saved report as read back from the database
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReport {
    /// Database ID returned by the save
    pub id: ReportId,
    /// Report kind
    pub kind: ReportKind,
    /// Report title
    pub title: String,
    /// The full report record
    pub payload: ReportPayload,
    /// Model-construction timestamp
    pub generated_at: DateTime<Utc>,
    /// When the record was saved
    pub saved_at: DateTime<Utc>,
}

impl TryFrom<ReportRow> for StoredReport {
    type Error = PersistenceError;

    fn try_from(row: ReportRow) -> std::result::Result<Self, Self::Error> {
        let id = row.id;
        let corrupt = |reason: String| PersistenceError::CorruptRecord { id, reason };

        let payload: ReportPayload =
            serde_json::from_str(&row.payload).map_err(|e| corrupt(e.to_string()))?;
        let kind = payload.kind();
        if row.kind != kind_name(kind) {
            return Err(corrupt(format!(
                "kind column '{}' does not match the {} payload",
                row.kind,
                kind_name(kind)
            )));
        }

        Ok(StoredReport {
            id: ReportId(id),
            kind,
            title: row.title,
            payload,
            generated_at: timestamp(row.generated_at).ok_or_else(|| {
                corrupt(format!("generated_at {} is out of range", row.generated_at))
            })?,
            saved_at: timestamp(row.saved_at)
                .ok_or_else(|| corrupt(format!("saved_at {} is out of range", row.saved_at)))?,
        })
    }
}

/// Summary row for listing saved reports without decoding payloads
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ReportSummary {
    /// Database ID
    pub id: i64,
    /// Report kind ("analytics" or "esg")
    pub kind: String,
    /// Report title
    pub title: String,
    /// Unix timestamp of the save
    pub saved_at: i64,
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

/// Value stored in the `kind` column
pub(crate) fn kind_name(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Analytics => "analytics",
        ReportKind::Esg => "esg",
    }
}

/// Database handle for ecoflow-reports
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
