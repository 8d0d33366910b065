//! Per-format pipeline steps.

use crate::error::{EncodingError, Result};
use crate::types::{Artifact, ExportFormat, ExportOutcome, ReportPayload};

use super::ExportCoordinator;

impl ExportCoordinator {
    /// Run the pipeline for `format`; the caller holds the in-flight guard
    pub(super) async fn run_pipeline(
        &self,
        format: ExportFormat,
        report: &ReportPayload,
    ) -> Result<ExportOutcome> {
        report.validate()?;

        match format {
            ExportFormat::Document => {
                let handle = self.renderer.materialize(report)?;
                let artifact = self.capture.capture(&handle).await?;
                self.deliver(artifact).await
            }
            ExportFormat::Spreadsheet | ExportFormat::Csv => {
                let artifact = self.encode_tabular(format, report).await?;
                self.deliver(artifact).await
            }
            ExportFormat::Save => {
                let id = self.store.save(report).await?;
                tracing::info!(report_id = %id, store = self.store.name(), "Report saved");
                Ok(ExportOutcome::Saved { id })
            }
        }
    }

    async fn encode_tabular(&self, format: ExportFormat, report: &ReportPayload) -> Result<Artifact> {
        let tabular = self.tabular.clone();
        let report = report.clone();
        tokio::task::spawn_blocking(move || match format {
            ExportFormat::Spreadsheet => tabular.spreadsheet(&report),
            _ => tabular.csv(&report),
        })
        .await
        .map_err(|e| EncodingError::TaskFailed(e.to_string()))?
    }

    async fn deliver(&self, artifact: Artifact) -> Result<ExportOutcome> {
        let handle = self.sink.deliver(&artifact).await?;
        Ok(ExportOutcome::Delivered(handle))
    }
}
