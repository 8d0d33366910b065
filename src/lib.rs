//! # ecoflow-reports
//!
//! Report generation and multi-format export for the EcoFlow energy dashboard.
//!
//! ## Design Philosophy
//!
//! ecoflow-reports is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Single-flight** - One export at a time; a second trigger is rejected, never queued
//! - **Typed failures** - Every pipeline error surfaces as one of a few error kinds
//! - **Event-driven** - Consumers watch the export state and subscribe to events
//!
//! ## Quick Start
//!
//! ```no_run
//! use ecoflow_reports::{
//!     Config, ExportCoordinator, ExportFormat, InMemoryAggregator, ReportModelBuilder,
//!     SystemClock, TimeFrame, TimeWindow,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = ExportCoordinator::open(Config::default()).await?;
//!
//!     let clock = Arc::new(SystemClock);
//!     let builder = ReportModelBuilder::new(clock);
//!     let aggregator = InMemoryAggregator::new(vec![]);
//!     let window = TimeWindow::ending_at(chrono::Utc::now(), TimeFrame::Week);
//!     let report = builder.build_analytics(&aggregator, &window);
//!
//!     // Drive a busy indicator from state transitions
//!     let mut state = coordinator.watch_state();
//!     tokio::spawn(async move {
//!         while state.changed().await.is_ok() {
//!             println!("export state: {:?}", *state.borrow());
//!         }
//!     });
//!
//!     let outcome = coordinator.export(ExportFormat::Document, report).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Document capture (raster + PDF)
pub mod capture;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Export coordination (single-flight state machine)
pub mod exporter;
/// Metric sources, time windows and clocks
pub mod metrics;
/// Report model construction
pub mod model;
/// Page templates and render surfaces
pub mod render;
/// Artifact delivery
pub mod sink;
/// Report storage gateway
pub mod store;
/// Delimited text and spreadsheet export
pub mod tabular;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use capture::CaptureEncoder;
pub use config::{CaptureConfig, Config, OutputConfig, PersistenceConfig, ReportConfig, TabularConfig};
pub use db::{Database, ReportSummary, StoredReport};
pub use error::{EncodingError, Error, PersistenceError, RenderError, Result, ValidationError};
pub use exporter::ExportCoordinator;
pub use metrics::{
    Clock, EnergyObservation, FixedClock, InMemoryAggregator, MetricsAggregator, SystemClock,
    TimeFrame, TimeWindow,
};
pub use model::{EsgMetrics, PillarMetrics, ReportModelBuilder};
pub use render::{MaterializedSurface, SurfaceHandle, TemplateRenderer};
pub use sink::{ArtifactSink, DirectorySink};
pub use store::ReportStore;
pub use tabular::{TabularEncoder, TabularRow};
pub use types::{
    Artifact, ArtifactHandle, EsgReportData, Event, ExportFormat, ExportOutcome, ExportState,
    MetricValue, Pillar, PillarScore, ReportData, ReportId, ReportKind, ReportMetric,
    ReportPayload,
};
