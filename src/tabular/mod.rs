//! Tabular export: flattens a report into rows and serializes them as
//! delimited text or as an Office Open XML workbook.

mod delimited;
mod workbook;

use serde::{Deserialize, Serialize};

use crate::config::TabularConfig;
use crate::error::Result;
use crate::types::{
    Artifact, EsgReportData, ExportFormat, PillarScore, ReportData, ReportPayload,
    artifact_filename,
};

/// One row of a tabular export
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TabularRow {
    /// Grouping (e.g. "Metric", "Environmental")
    pub section: String,
    /// Row label
    pub label: String,
    /// Formatted value
    pub value: String,
    /// Unit, empty when not applicable
    pub unit: String,
    /// Percent change against the previous period
    pub trend: Option<f64>,
}

impl TabularRow {
    fn new(section: &str, label: impl Into<String>, value: impl ToString, unit: &str) -> Self {
        Self {
            section: section.to_string(),
            label: label.into(),
            value: value.to_string(),
            unit: unit.to_string(),
            trend: None,
        }
    }
}

/// Flatten a report into rows, preserving metric and list order
pub fn rows(report: &ReportPayload) -> Vec<TabularRow> {
    match report {
        ReportPayload::Analytics(data) => analytics_rows(data),
        ReportPayload::Esg(data) => esg_rows(data),
    }
}

fn analytics_rows(report: &ReportData) -> Vec<TabularRow> {
    let mut rows = vec![
        TabularRow::new("Report", "Title", &report.title, ""),
        TabularRow::new("Report", "Generated At", report.generated_at.to_rfc3339(), ""),
    ];
    rows.extend(report.metrics.iter().map(|metric| TabularRow {
        section: "Metric".into(),
        label: metric.label.clone(),
        value: metric.value.to_string(),
        unit: metric.unit.clone(),
        trend: metric.trend,
    }));
    rows.extend(report.recommendations.iter().enumerate().map(|(i, text)| {
        TabularRow::new("Recommendation", format!("Recommendation {}", i + 1), text, "")
    }));
    rows
}

fn esg_rows(report: &EsgReportData) -> Vec<TabularRow> {
    let mut rows = vec![
        TabularRow::new("Summary", "Company", &report.company_name, ""),
        TabularRow::new("Summary", "Period", &report.report_period, ""),
        TabularRow::new("Summary", "Overall Score", report.overall_score, "/100"),
        TabularRow::new("Summary", "Industry Ranking", report.industry_ranking, ""),
    ];
    for pillar in report.pillars() {
        pillar_rows(&mut rows, pillar);
    }
    rows.extend(report.certifications.iter().enumerate().map(|(i, name)| {
        TabularRow::new("Certification", format!("Certification {}", i + 1), name, "")
    }));
    rows.extend(report.improvement_areas.iter().enumerate().map(|(i, area)| {
        TabularRow::new("Improvement Area", format!("Improvement Area {}", i + 1), area, "")
    }));
    rows
}

fn pillar_rows(rows: &mut Vec<TabularRow>, pillar: &PillarScore) {
    let section = pillar.pillar.title();
    rows.push(TabularRow::new(section, "Pillar Score", pillar.score, "/100"));
    for sub in &pillar.sub_scores {
        rows.push(TabularRow::new(section, &sub.label, sub.value, "%"));
    }
    for count in &pillar.counts {
        rows.push(TabularRow::new(section, &count.label, count.value, ""));
    }
}

/// Encodes reports as delimited text or spreadsheets
#[derive(Clone, Debug)]
pub struct TabularEncoder {
    product_name: String,
    delimiter: u8,
    sheet_name: String,
}

impl TabularEncoder {
    /// Create an encoder from tabular settings
    ///
    /// The delimiter is validated as ASCII by [`crate::Config::validate`].
    pub fn new(product_name: impl Into<String>, config: &TabularConfig) -> Self {
        Self {
            product_name: product_name.into(),
            delimiter: u8::try_from(config.delimiter).unwrap_or(b','),
            sheet_name: config.sheet_name.clone(),
        }
    }

    /// Encode `report` as delimited text with a header row
    pub fn csv(&self, report: &ReportPayload) -> Result<Artifact> {
        let rows = rows(report);
        let bytes = delimited::write(&rows, self.delimiter)?;
        Ok(self.artifact(ExportFormat::Csv, report, "csv", bytes, rows.len()))
    }

    /// Encode `report` as a single-sheet workbook
    pub fn spreadsheet(&self, report: &ReportPayload) -> Result<Artifact> {
        let rows = rows(report);
        let bytes = workbook::write(&rows, &self.sheet_name)?;
        Ok(self.artifact(ExportFormat::Spreadsheet, report, "xlsx", bytes, rows.len()))
    }

    fn artifact(
        &self,
        format: ExportFormat,
        report: &ReportPayload,
        extension: &str,
        bytes: Vec<u8>,
        row_count: usize,
    ) -> Artifact {
        let filename = artifact_filename(
            &self.product_name,
            report.kind(),
            report.generated_at(),
            extension,
        );
        tracing::info!(
            filename = %filename,
            rows = row_count,
            size_bytes = bytes.len(),
            "Encoded tabular report"
        );
        Artifact {
            format,
            filename,
            bytes,
        }
    }
}
