//! Saved report operations.

use crate::error::PersistenceError;
use crate::types::{ReportId, ReportPayload};
use crate::Result;

use super::{Database, ReportRow, ReportSummary, StoredReport, kind_name};

impl Database {
    /// Insert a report record and return its new ID
    ///
    /// Saves are not deduplicated: saving the same record twice yields two rows.
    pub async fn insert_report(&self, report: &ReportPayload) -> Result<ReportId> {
        let payload = serde_json::to_string(report).map_err(PersistenceError::Serialization)?;
        let kind = kind_name(report.kind());

        let result = sqlx::query(
            r#"
            INSERT INTO reports (kind, title, payload, generated_at, saved_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(kind)
        .bind(report.title())
        .bind(payload)
        .bind(report.generated_at().timestamp())
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await?;

        Ok(ReportId(result.last_insert_rowid()))
    }

    /// Get a saved report by ID
    pub async fn get_report(&self, id: ReportId) -> Result<Option<StoredReport>> {
        let row = sqlx::query_as::<_, ReportRow>(
            r#"
            SELECT id, kind, title, payload, generated_at, saved_at
            FROM reports
            WHERE id = ?
            "#,
        )
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StoredReport::try_from).transpose()?)
    }

    /// List saved reports, most recent first
    pub async fn list_reports(&self, limit: usize, offset: usize) -> Result<Vec<ReportSummary>> {
        let rows = sqlx::query_as::<_, ReportSummary>(
            r#"
            SELECT id, kind, title, saved_at
            FROM reports
            ORDER BY saved_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Count saved reports
    pub async fn count_reports(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reports")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
