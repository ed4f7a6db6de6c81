use tokio_util::sync::CancellationToken;
use tracing::info;

use super::progress::ProgressObserver;
use super::refresh_coordinator::RefreshCoordinator;
use crate::errors::CoreError;
use crate::models::refresh::RefreshReport;
use crate::storage::traits::HoldingsStore;

/// Runs a refresh against a holdings store and writes the results back in one batch.
///
/// Flow: `list` → coordinator run → `apply_updates` (once) → `persist` →
/// `on_finished`. The store is never touched while fetches are in flight, so
/// readers only ever see the state before or after a whole run.
pub struct HoldingsRefresher {
    coordinator: RefreshCoordinator,
}

impl HoldingsRefresher {
    pub fn new(coordinator: RefreshCoordinator) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Refresh every holding in `store`.
    ///
    /// A cancelled run still reconciles whatever completed before cancellation.
    /// Only store errors and precondition violations are returned as `Err`;
    /// `on_finished` is still called when the store write fails.
    pub async fn refresh(
        &self,
        store: &mut dyn HoldingsStore,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<RefreshReport, CoreError> {
        let holdings = store.list()?;
        let report = self.coordinator.run(&holdings, observer, cancel).await?;

        let reconciled = store
            .apply_updates(&report.updated)
            .and_then(|applied| store.persist().map(|()| applied));

        // Sent whether or not the store write succeeded.
        observer.on_finished(&report.summary);

        let applied = reconciled?;
        info!(
            applied,
            completion = %report.summary.completion,
            "Reconciled refreshed holdings"
        );
        Ok(report)
    }
}
