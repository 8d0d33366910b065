//! Core types for ecoflow-reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::ValidationError;

/// Canonical label of the total energy consumption metric
pub const TOTAL_CONSUMPTION: &str = "Total Consumption";
/// Canonical label of the total cost metric
pub const TOTAL_COST: &str = "Total Cost";
/// Canonical label of the total emissions metric
pub const CO2_EMISSIONS: &str = "CO₂ Emissions";

/// Labels every analytics report must carry; templates look metrics up by these
pub const CANONICAL_LABELS: [&str; 3] = [TOTAL_CONSUMPTION, TOTAL_COST, CO2_EMISSIONS];

/// Identifier of a persisted report record
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub i64);

impl ReportId {
    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ReportId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Export target selected by the user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Single-page PDF captured from the rendered layout
    Document,
    /// Office Open XML workbook
    Spreadsheet,
    /// Comma-separated values
    Csv,
    /// Persist the report record
    Save,
}

impl ExportFormat {
    /// File extension for artifact-producing formats (`None` for [`ExportFormat::Save`])
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Document => Some("pdf"),
            ExportFormat::Spreadsheet => Some("xlsx"),
            ExportFormat::Csv => Some("csv"),
            ExportFormat::Save => None,
        }
    }

    /// MIME type of the produced artifact
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            ExportFormat::Document => Some("application/pdf"),
            ExportFormat::Spreadsheet => {
                Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
            }
            ExportFormat::Csv => Some("text/csv"),
            ExportFormat::Save => None,
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ExportFormat::Document => "document",
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Csv => "csv",
            ExportFormat::Save => "save",
        };
        f.write_str(name)
    }
}

/// Coordinator state; at most one `InFlight` exists per coordinator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "format", rename_all = "snake_case")]
pub enum ExportState {
    /// No export running
    #[default]
    Idle,
    /// An export of the given format is running
    InFlight(ExportFormat),
}

impl ExportState {
    /// Whether an export is currently running
    pub fn is_in_flight(&self) -> bool {
        matches!(self, ExportState::InFlight(_))
    }

    /// Whether the busy indicator of `format` should be shown
    pub fn is_busy(&self, format: ExportFormat) -> bool {
        *self == ExportState::InFlight(format)
    }
}

/// Kind of report, used in artifact names and template selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    /// Energy analytics report
    Analytics,
    /// ESG and sustainability report
    Esg,
}

impl ReportKind {
    /// Name used inside artifact filenames
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ReportKind::Analytics => "Analytics",
            ReportKind::Esg => "ESG",
        }
    }
}

/// Value of a report metric
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Preformatted text (e.g. "60.0", "$1.2K")
    Text(String),
    /// Raw number
    Number(f64),
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for MetricValue {
    fn from(s: &str) -> Self {
        MetricValue::Text(s.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(s: String) -> Self {
        MetricValue::Text(s)
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

/// One labelled metric of a report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportMetric {
    /// Lookup key, unique within a report
    pub label: String,
    /// Metric value
    pub value: MetricValue,
    /// Unit (may be empty, e.g. for currency)
    pub unit: String,
    /// Percent change against the previous period
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<f64>,
}

impl ReportMetric {
    /// Create a metric without a trend
    pub fn new(label: impl Into<String>, value: impl Into<MetricValue>, unit: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            unit: unit.into(),
            trend: None,
        }
    }

    /// Attach a trend
    pub fn with_trend(mut self, trend: Option<f64>) -> Self {
        self.trend = trend;
        self
    }
}

/// Analytics report record; never mutated after construction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// Report title
    pub title: String,
    /// Fixed at model-construction time
    pub generated_at: DateTime<Utc>,
    /// Metrics in display order
    pub metrics: Vec<ReportMetric>,
    /// Recommendations in display order
    pub recommendations: Vec<String>,
}

impl ReportData {
    /// Look up a metric by label
    pub fn metric(&self, label: &str) -> Option<&ReportMetric> {
        self.metrics.iter().find(|m| m.label == label)
    }

    /// Look up a metric that templates depend on
    pub fn require_metric(&self, label: &str) -> Result<&ReportMetric, ValidationError> {
        self.metric(label)
            .ok_or_else(|| ValidationError::MissingMetric {
                label: label.to_string(),
            })
    }

    /// Check label uniqueness and presence of the canonical labels
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.label.as_str()) {
                return Err(ValidationError::DuplicateMetric {
                    label: metric.label.clone(),
                });
            }
        }
        for label in CANONICAL_LABELS {
            self.require_metric(label)?;
        }
        Ok(())
    }
}

/// ESG pillar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pillar {
    /// Environmental
    Environmental,
    /// Social
    Social,
    /// Governance
    Governance,
}

impl Pillar {
    /// All pillars in report order
    pub const ALL: [Pillar; 3] = [Pillar::Environmental, Pillar::Social, Pillar::Governance];

    /// The three sub-scores averaged into the pillar score, with display labels
    pub fn required_sub_scores(&self) -> [(&'static str, &'static str); 3] {
        match self {
            Pillar::Environmental => [
                ("carbon_reduction", "Carbon Reduction"),
                ("renewable_usage", "Renewable Usage"),
                ("waste_reduction", "Waste Reduction"),
            ],
            Pillar::Social => [
                ("community_impact", "Community Impact"),
                ("health_benefits", "Health Benefits"),
                ("education_programs", "Education Programs"),
            ],
            Pillar::Governance => [
                ("transparency_score", "Transparency"),
                ("compliance_rating", "Compliance Rating"),
                ("ethics_score", "Ethics Score"),
            ],
        }
    }

    /// Display name
    pub fn title(&self) -> &'static str {
        match self {
            Pillar::Environmental => "Environmental",
            Pillar::Social => "Social",
            Pillar::Governance => "Governance",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title().to_lowercase())
    }
}

/// Named percentage sub-score
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubScore {
    /// Input key
    pub key: String,
    /// Display label
    pub label: String,
    /// Percentage
    pub value: f64,
}

/// Named count (e.g. jobs created)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedCount {
    /// Input key
    pub key: String,
    /// Display label
    pub label: String,
    /// Count
    pub value: u64,
}

/// Scored pillar of an ESG report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PillarScore {
    /// Which pillar
    pub pillar: Pillar,
    /// Mean of the three required sub-scores, two decimals
    pub score: f64,
    /// Required sub-scores first, then any extra ones
    pub sub_scores: Vec<SubScore>,
    /// Counts reported alongside the scores
    pub counts: Vec<NamedCount>,
}

/// ESG report record; never mutated after construction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EsgReportData {
    /// Reporting company
    pub company_name: String,
    /// Human-readable period (e.g. "Q4 2024")
    pub report_period: String,
    /// Overall score in `[0, 100]`
    pub overall_score: f64,
    /// Position in the industry ranking (1 = best)
    pub industry_ranking: u32,
    /// Environmental pillar
    pub environmental: PillarScore,
    /// Social pillar
    pub social: PillarScore,
    /// Governance pillar
    pub governance: PillarScore,
    /// Certifications held
    pub certifications: Vec<String>,
    /// Areas flagged for improvement
    pub improvement_areas: Vec<String>,
    /// Fixed at model-construction time
    pub generated_at: DateTime<Utc>,
}

impl PillarScore {
    /// Check that `pillar`'s required sub-scores are present and every
    /// sub-score is a percentage
    pub fn validate(&self, pillar: Pillar) -> Result<(), ValidationError> {
        for (key, _) in pillar.required_sub_scores() {
            if !self.sub_scores.iter().any(|s| s.key == key) {
                return Err(ValidationError::MissingSubScore {
                    pillar: pillar.to_string(),
                    key: key.to_string(),
                });
            }
        }
        for sub in &self.sub_scores {
            check_percentage(&format!("{}.{}", pillar, sub.key), sub.value)?;
        }
        check_percentage(&format!("{}.score", pillar), self.score)
    }
}

impl EsgReportData {
    /// Pillars in report order
    pub fn pillars(&self) -> [&PillarScore; 3] {
        [&self.environmental, &self.social, &self.governance]
    }

    /// Check the overall score, the ranking and every pillar
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_percentage("overall_score", self.overall_score)?;
        if self.industry_ranking == 0 {
            return Err(ValidationError::InvalidRanking);
        }
        for (pillar, score) in Pillar::ALL.into_iter().zip(self.pillars()) {
            score.validate(pillar)?;
        }
        Ok(())
    }
}

/// Reject values that are not finite percentages in `[0, 100]`
pub(crate) fn check_percentage(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
        })
    }
}

/// Report handed to the coordinator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "report", rename_all = "lowercase")]
pub enum ReportPayload {
    /// Analytics report
    Analytics(ReportData),
    /// ESG report
    Esg(EsgReportData),
}

impl ReportPayload {
    /// Report kind
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportPayload::Analytics(_) => ReportKind::Analytics,
            ReportPayload::Esg(_) => ReportKind::Esg,
        }
    }

    /// Title used for storage and document metadata
    pub fn title(&self) -> String {
        match self {
            ReportPayload::Analytics(r) => r.title.clone(),
            ReportPayload::Esg(r) => format!("ESG & Sustainability Report - {}", r.company_name),
        }
    }

    /// Model-construction timestamp
    pub fn generated_at(&self) -> DateTime<Utc> {
        match self {
            ReportPayload::Analytics(r) => r.generated_at,
            ReportPayload::Esg(r) => r.generated_at,
        }
    }

    /// Validate the record before any pipeline step runs
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            ReportPayload::Analytics(r) => r.validate(),
            ReportPayload::Esg(r) => r.validate(),
        }
    }
}

impl From<ReportData> for ReportPayload {
    fn from(r: ReportData) -> Self {
        ReportPayload::Analytics(r)
    }
}

impl From<EsgReportData> for ReportPayload {
    fn from(r: EsgReportData) -> Self {
        ReportPayload::Esg(r)
    }
}

/// Artifact filename: `<ProductName>_<ReportKind>_Report_<YYYY-MM-DD>.<ext>`
///
/// The date is the calendar date of `generated_at`, not the time of encoding.
pub fn artifact_filename(
    product_name: &str,
    kind: ReportKind,
    generated_at: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}_{}_Report_{}.{}",
        product_name,
        kind.artifact_name(),
        generated_at.format("%Y-%m-%d"),
        extension
    )
}

/// Encoded artifact ready for delivery
#[derive(Clone, Debug)]
pub struct Artifact {
    /// Format that produced it
    pub format: ExportFormat,
    /// Target filename
    pub filename: String,
    /// Encoded bytes
    pub bytes: Vec<u8>,
}

/// Handle to a delivered artifact
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHandle {
    /// Format that produced it
    pub format: ExportFormat,
    /// Filename
    pub filename: String,
    /// Where the sink placed it
    pub path: PathBuf,
    /// Size of the artifact
    pub size_bytes: u64,
}

/// Successful export result
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExportOutcome {
    /// Artifact written to its output sink
    Delivered(ArtifactHandle),
    /// Report persisted
    Saved {
        /// Identifier returned by the store
        id: ReportId,
    },
}

/// Event emitted by the export coordinator
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An export moved the coordinator to `InFlight`
    ExportStarted {
        /// Export format
        format: ExportFormat,
        /// Report kind
        kind: ReportKind,
    },

    /// An export finished and the coordinator is idle again
    ExportCompleted {
        /// Export format
        format: ExportFormat,
        /// What was produced
        outcome: ExportOutcome,
    },

    /// An export failed and the coordinator is idle again
    ExportFailed {
        /// Export format
        format: ExportFormat,
        /// Machine-readable error code
        code: String,
        /// Error message
        error: String,
    },
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(labels: &[&str]) -> ReportData {
        ReportData {
            title: "Advanced Analytics Report".into(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap(),
            metrics: labels
                .iter()
                .map(|l| ReportMetric::new(*l, "1.0", "kWh"))
                .collect(),
            recommendations: vec![],
        }
    }

    #[test]
    fn filename_uses_generation_date() {
        let generated_at = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
        assert_eq!(
            artifact_filename("EcoFlow", ReportKind::Analytics, generated_at, "pdf"),
            "EcoFlow_Analytics_Report_2024-01-15.pdf"
        );
        assert_eq!(
            artifact_filename("EcoFlow", ReportKind::Esg, generated_at, "csv"),
            "EcoFlow_ESG_Report_2024-01-15.csv"
        );
    }

    #[test]
    fn validate_accepts_canonical_report() {
        assert!(report(&CANONICAL_LABELS).validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_canonical_label() {
        let err = report(&[TOTAL_CONSUMPTION, TOTAL_COST]).validate().unwrap_err();
        assert!(
            matches!(err, ValidationError::MissingMetric { ref label } if label == CO2_EMISSIONS)
        );
    }

    #[test]
    fn validate_rejects_duplicate_labels() {
        let err = report(&[TOTAL_CONSUMPTION, TOTAL_COST, CO2_EMISSIONS, TOTAL_COST])
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateMetric { .. }));
    }

    #[test]
    fn export_state_busy_is_per_format() {
        let state = ExportState::InFlight(ExportFormat::Csv);
        assert!(state.is_in_flight());
        assert!(state.is_busy(ExportFormat::Csv));
        assert!(!state.is_busy(ExportFormat::Document));
        assert!(!ExportState::Idle.is_in_flight());
    }

    #[test]
    fn export_state_serializes_with_format() {
        let json = serde_json::to_string(&ExportState::InFlight(ExportFormat::Spreadsheet)).unwrap();
        assert_eq!(json, r#"{"state":"in_flight","format":"spreadsheet"}"#);
        let idle = serde_json::to_string(&ExportState::Idle).unwrap();
        assert_eq!(idle, r#"{"state":"idle"}"#);
    }

    #[test]
    fn metric_value_serializes_untagged() {
        let m = ReportMetric::new(TOTAL_CONSUMPTION, "60.0", "kWh").with_trend(Some(5.2));
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["value"], "60.0");
        assert_eq!(json["trend"], 5.2);

        let n = ReportMetric::new("Score", 84.5, "%");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["value"], 84.5);
        assert!(json.get("trend").is_none());
    }
}
