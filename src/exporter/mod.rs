//! Export coordination: the single-flight state machine over all formats.
//!
//! The [`ExportCoordinator`] owns the renderer, both encoders and the two
//! output sinks (artifact delivery and report storage). Its methods are split
//! by concern:
//! - [`state`] - Single-flight guard driving `Idle` / `InFlight(format)`
//! - [`pipeline`] - Per-format pipeline steps

mod pipeline;
mod state;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;
use tokio::sync::{broadcast, watch};

use crate::capture::CaptureEncoder;
use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::render::TemplateRenderer;
use crate::sink::{ArtifactSink, DirectorySink};
use crate::store::ReportStore;
use crate::tabular::TabularEncoder;
use crate::types::{Event, ExportFormat, ExportOutcome, ExportState, ReportPayload};
use state::InFlightGuard;

/// Export coordinator (cloneable - all fields are shared handles)
///
/// At most one export runs at a time across all formats. A trigger while
/// another export is in flight fails with [`crate::Error::Concurrency`] and
/// leaves the running export untouched.
#[derive(Clone)]
pub struct ExportCoordinator {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Lays out reports and holds the active surface
    pub(crate) renderer: Arc<TemplateRenderer>,
    /// Surface to document encoder
    pub(crate) capture: CaptureEncoder,
    /// Report to CSV / spreadsheet encoder
    pub(crate) tabular: TabularEncoder,
    /// Storage backend for the save format
    pub(crate) store: Arc<dyn ReportStore>,
    /// Destination of encoded artifacts
    pub(crate) sink: Arc<dyn ArtifactSink>,
    /// Current export state; receivers drive busy indicators
    pub(crate) state_tx: Arc<watch::Sender<ExportState>>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl ExportCoordinator {
    /// Create a coordinator over the given storage and delivery backends
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if the configuration is invalid.
    pub fn new(
        config: Config,
        store: Arc<dyn ReportStore>,
        sink: Arc<dyn ArtifactSink>,
    ) -> Result<Self> {
        config.validate()?;

        let renderer = TemplateRenderer::new(&config.product_name, config.capture.load_system_fonts);
        let capture = CaptureEncoder::new(&config.product_name, &config.capture);
        let tabular = TabularEncoder::new(&config.product_name, &config.tabular);

        let (event_tx, _rx) = broadcast::channel(100);

        tracing::info!(
            product = %config.product_name,
            store = store.name(),
            "Export coordinator initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            renderer: Arc::new(renderer),
            capture,
            tabular,
            store,
            sink,
            state_tx: Arc::new(watch::Sender::new(ExportState::Idle)),
            event_tx,
        })
    }

    /// Create a coordinator backed by the configured SQLite database and
    /// output directory
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::new(&config.persistence.database_path).await?;
        let sink = DirectorySink::new(config.output.output_dir.clone());
        Self::new(config, Arc::new(db), Arc::new(sink))
    }

    /// Export `report` in `format`
    ///
    /// The state is `InFlight(format)` for the duration of the pipeline and
    /// `Idle` again by the time this returns, on every path.
    pub async fn export(
        &self,
        format: ExportFormat,
        report: impl Into<ReportPayload>,
    ) -> Result<ExportOutcome> {
        let report = report.into();
        let guard = InFlightGuard::acquire(&self.state_tx, format).inspect_err(|e| {
            tracing::warn!(format = %format, error = %e, "Export rejected");
        })?;

        tracing::info!(format = %format, kind = ?report.kind(), "Export started");
        self.emit_event(Event::ExportStarted {
            format,
            kind: report.kind(),
        });

        let result = self.run_pipeline(format, &report).await;
        drop(guard);

        match &result {
            Ok(outcome) => {
                tracing::info!(format = %format, "Export completed");
                self.emit_event(Event::ExportCompleted {
                    format,
                    outcome: outcome.clone(),
                });
            }
            Err(e) => {
                tracing::warn!(format = %format, error = %e, "Export failed");
                self.emit_event(Event::ExportFailed {
                    format,
                    code: e.error_code().to_string(),
                    error: e.to_string(),
                });
            }
        }

        result
    }

    /// Current export state
    pub fn state(&self) -> ExportState {
        *self.state_tx.borrow()
    }

    /// Receiver that observes every state transition
    pub fn watch_state(&self) -> watch::Receiver<ExportState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to export events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Renderer holding the active report surface
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Tear down the active report surface (e.g. the user navigated away)
    ///
    /// A document export whose capture has not finished fails with a render
    /// error; the coordinator still returns to `Idle`.
    pub fn teardown_surface(&self) {
        self.renderer.teardown();
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}
