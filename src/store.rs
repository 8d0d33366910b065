//! Persistence gateway for saved reports

use async_trait::async_trait;

use crate::db::Database;
use crate::types::{ReportId, ReportPayload};

/// Trait for persisting report records
///
/// The export coordinator hands the validated report to the store when the
/// user picks "save". Each call creates a new record; implementations must not
/// deduplicate.
///
/// # Examples
///
/// ```no_run
/// use ecoflow_reports::{Database, ReportStore};
/// use std::path::Path;
///
/// # async fn example(report: ecoflow_reports::ReportPayload) -> ecoflow_reports::Result<()> {
/// let store = Database::new(Path::new("reports.db")).await?;
/// let id = store.save(&report).await?;
/// println!("saved as {}", id);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist `report` and return the identifier of the new record
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the backend rejects the write.
    async fn save(&self, report: &ReportPayload) -> crate::Result<ReportId>;

    /// Name of the backend for logging
    fn name(&self) -> &'static str;
}

#[async_trait]
impl ReportStore for Database {
    async fn save(&self, report: &ReportPayload) -> crate::Result<ReportId> {
        self.insert_report(report).await
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
