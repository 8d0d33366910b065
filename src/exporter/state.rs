//! Single-flight guard over the coordinator state.

use std::sync::Arc;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::types::{ExportFormat, ExportState};

/// Holds the coordinator in `InFlight(format)` for as long as it lives
///
/// Dropping the guard returns the state to `Idle`, whether the pipeline
/// returned, failed, panicked, or the export future was dropped.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    state: Arc<watch::Sender<ExportState>>,
    format: ExportFormat,
}

impl InFlightGuard {
    /// Move `Idle -> InFlight(format)` atomically, or report the busy format
    pub(crate) fn acquire(
        state: &Arc<watch::Sender<ExportState>>,
        format: ExportFormat,
    ) -> Result<Self> {
        let mut busy = None;
        let acquired = state.send_if_modified(|current| match *current {
            ExportState::Idle => {
                *current = ExportState::InFlight(format);
                true
            }
            ExportState::InFlight(active) => {
                busy = Some(active);
                false
            }
        });

        if acquired {
            Ok(Self {
                state: Arc::clone(state),
                format,
            })
        } else {
            Err(Error::Concurrency {
                in_flight: busy.unwrap_or(format),
            })
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.send_replace(ExportState::Idle);
        tracing::debug!(format = %self.format, "Export slot released");
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Arc<watch::Sender<ExportState>> {
        Arc::new(watch::Sender::new(ExportState::Idle))
    }

    #[test]
    fn guard_holds_and_releases_slot() {
        let state = channel();
        let guard = InFlightGuard::acquire(&state, ExportFormat::Csv).unwrap();
        assert_eq!(*state.borrow(), ExportState::InFlight(ExportFormat::Csv));

        drop(guard);
        assert_eq!(*state.borrow(), ExportState::Idle);
    }

    #[test]
    fn second_acquire_reports_active_format() {
        let state = channel();
        let _guard = InFlightGuard::acquire(&state, ExportFormat::Document).unwrap();

        let err = InFlightGuard::acquire(&state, ExportFormat::Save).unwrap_err();
        assert!(matches!(
            err,
            Error::Concurrency {
                in_flight: ExportFormat::Document
            }
        ));
        // The rejected attempt leaves the running export untouched
        assert_eq!(*state.borrow(), ExportState::InFlight(ExportFormat::Document));
    }

    #[test]
    fn slot_is_reusable_after_release() {
        let state = channel();
        drop(InFlightGuard::acquire(&state, ExportFormat::Spreadsheet).unwrap());
        let _again = InFlightGuard::acquire(&state, ExportFormat::Spreadsheet).unwrap();
        assert!(state.borrow().is_busy(ExportFormat::Spreadsheet));
    }

    #[test]
    fn receivers_observe_transitions() {
        let state = channel();
        let mut rx = state.subscribe();
        let guard = InFlightGuard::acquire(&state, ExportFormat::Csv).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_in_flight());

        drop(guard);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), ExportState::Idle);
    }
}
