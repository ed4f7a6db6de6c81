use tokio::sync::mpsc::UnboundedSender;

use crate::models::refresh::{RefreshEvent, RefreshProgress, RefreshSummary};

/// Receives live progress and the terminal summary of a refresh run.
///
/// Calls arrive from the coordinator's completion loop, one at a time and in
/// order. Implementations must not block.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: RefreshProgress);

    fn on_finished(&self, _summary: &RefreshSummary) {}
}

/// Observer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _progress: RefreshProgress) {}
}

/// Forwards events into a channel. A dropped receiver is ignored: the run
/// does not depend on anyone listening.
impl ProgressObserver for UnboundedSender<RefreshEvent> {
    fn on_progress(&self, progress: RefreshProgress) {
        let _ = self.send(RefreshEvent::Progress(progress));
    }

    fn on_finished(&self, summary: &RefreshSummary) {
        let _ = self.send(RefreshEvent::Finished(*summary));
    }
}
