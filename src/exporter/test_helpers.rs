//! Shared test helpers for building reports and ExportCoordinator instances.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;
use tokio::sync::Notify;

use crate::config::Config;
use crate::db::Database;
use crate::error::PersistenceError;
use crate::exporter::ExportCoordinator;
use crate::metrics::{EnergyObservation, FixedClock, InMemoryAggregator, TimeFrame, TimeWindow};
use crate::model::{EsgMetrics, PillarMetrics, ReportModelBuilder};
use crate::sink::{ArtifactSink, DirectorySink};
use crate::store::ReportStore;
use crate::types::{Artifact, ArtifactHandle, EsgReportData, ReportData, ReportId, ReportPayload};

/// Model-construction time of every fixture report
pub(crate) fn generated_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
}

fn builder() -> ReportModelBuilder {
    ReportModelBuilder::new(Arc::new(FixedClock(generated_at())))
}

/// Analytics report over a day with consumption `[10, 20, 30]`
pub(crate) fn analytics_report() -> ReportData {
    let now = generated_at();
    let series = [(10.0, 1.5, 4.0), (20.0, 2.5, 8.0), (30.0, 3.0, 12.0)]
        .iter()
        .enumerate()
        .map(|(i, (consumption, cost, co2))| EnergyObservation {
            timestamp: now - Duration::hours(3 - i as i64),
            consumption: *consumption,
            cost: *cost,
            co2_emissions: *co2,
        })
        .collect();
    let aggregator = InMemoryAggregator::new(series);
    builder().build_analytics(&aggregator, &TimeWindow::ending_at(now, TimeFrame::Day))
}

fn pillar(scores: &[(&str, f64)], counts: &[(&str, u64)]) -> PillarMetrics {
    PillarMetrics {
        scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        counts: counts
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// ESG report with environmental sub-scores `{84, 86, 84}`
pub(crate) fn esg_report() -> EsgReportData {
    builder()
        .build_esg(&EsgMetrics {
            company_name: "EcoFlow Energy Solutions".into(),
            report_period: "Q4 2024".into(),
            overall_score: 87.3,
            industry_ranking: 12,
            environmental: pillar(
                &[
                    ("carbon_reduction", 84.0),
                    ("renewable_usage", 86.0),
                    ("waste_reduction", 84.0),
                ],
                &[],
            ),
            social: pillar(
                &[
                    ("community_impact", 88.0),
                    ("health_benefits", 90.0),
                    ("education_programs", 83.0),
                ],
                &[("jobs_created", 156)],
            ),
            governance: pillar(
                &[
                    ("transparency_score", 91.0),
                    ("compliance_rating", 95.0),
                    ("ethics_score", 89.0),
                ],
                &[],
            ),
            certifications: vec!["ISO 14001".into(), "LEED Gold".into()],
            improvement_areas: vec!["Expand supplier audits to tier-2 vendors".into()],
        })
        .unwrap()
}

/// Config writing into `dir`, rendering small and without system fonts
pub(crate) fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.output.output_dir = dir.join("reports");
    config.persistence.database_path = dir.join("test.db");
    config.capture.scale = 0.25;
    config.capture.load_system_fonts = false;
    config
}

/// In-memory store that records every save, or rejects all of them
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub(crate) saved: Mutex<Vec<ReportPayload>>,
    pub(crate) reject: bool,
}

impl MemoryStore {
    pub(crate) fn rejecting() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            reject: true,
        }
    }
}

#[async_trait]
impl ReportStore for MemoryStore {
    async fn save(&self, report: &ReportPayload) -> crate::Result<ReportId> {
        if self.reject {
            return Err(PersistenceError::Rejected("quota exceeded".into()).into());
        }
        let mut saved = self.saved.lock().unwrap();
        saved.push(report.clone());
        Ok(ReportId(saved.len() as i64))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Sink that holds every delivery until the gate is opened
pub(crate) struct GatedSink {
    inner: DirectorySink,
    gate: Arc<Notify>,
}

impl GatedSink {
    pub(crate) fn new(dir: &Path, gate: Arc<Notify>) -> Self {
        Self {
            inner: DirectorySink::new(dir),
            gate,
        }
    }
}

#[async_trait]
impl ArtifactSink for GatedSink {
    async fn deliver(&self, artifact: &Artifact) -> crate::Result<ArtifactHandle> {
        self.gate.notified().await;
        self.inner.deliver(artifact).await
    }
}

/// Sink that panics mid-delivery
pub(crate) struct PanickingSink;

#[async_trait]
impl ArtifactSink for PanickingSink {
    async fn deliver(&self, _artifact: &Artifact) -> crate::Result<ArtifactHandle> {
        panic!("sink exploded");
    }
}

/// Coordinator over a persistent database and a directory sink.
/// Returns the coordinator and the tempdir (which must be kept alive).
pub(crate) async fn create_test_coordinator() -> (ExportCoordinator, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path());
    let coordinator = ExportCoordinator::open(config).await.unwrap();
    (coordinator, temp_dir)
}

/// Coordinator over custom backends
pub(crate) fn coordinator_with(
    dir: &Path,
    store: Arc<dyn ReportStore>,
    sink: Arc<dyn ArtifactSink>,
) -> ExportCoordinator {
    ExportCoordinator::new(test_config(dir), store, sink).unwrap()
}

/// Open the database of a coordinator created by [`create_test_coordinator`]
pub(crate) async fn open_test_database(dir: &Path) -> Database {
    Database::new(&dir.join("test.db")).await.unwrap()
}
