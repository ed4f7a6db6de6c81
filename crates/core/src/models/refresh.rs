use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::holding::Holding;

/// Progress of a refresh run: `current` of `total` holdings finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshProgress {
    pub current: usize,
    pub total: usize,
}

impl RefreshProgress {
    /// Progress at run start: `(0, total)`.
    pub fn start(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Count one more finished holding. Never exceeds `total`.
    pub fn advance(&mut self) {
        self.current = (self.current + 1).min(self.total);
    }

    pub fn is_complete(&self) -> bool {
        self.current == self.total
    }

    /// Finished fraction in `0.0..=1.0` (1.0 for an empty run).
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

/// Result of one holding's fetch-with-retry sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Both fetch calls succeeded; carries the holding with new market data.
    Updated(Holding),
    /// Every attempt failed. The holding keeps its previous data.
    Failed {
        holding_id: Uuid,
        fund_code: String,
        attempts: u32,
        reason: String,
    },
    /// The run was cancelled before this holding could finish.
    Cancelled { holding_id: Uuid },
}

impl RefreshOutcome {
    pub fn holding_id(&self) -> Uuid {
        match self {
            RefreshOutcome::Updated(h) => h.id,
            RefreshOutcome::Failed { holding_id, .. } => *holding_id,
            RefreshOutcome::Cancelled { holding_id } => *holding_id,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionKind {
    /// Every holding was attempted.
    Finished,
    /// There was nothing to refresh.
    Empty,
    /// The caller cancelled; results cover only what completed before that.
    Cancelled,
}

impl std::fmt::Display for CompletionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionKind::Finished => write!(f, "Finished"),
            CompletionKind::Empty => write!(f, "Empty"),
            CompletionKind::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Terminal summary reported to observers once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub total: usize,
    pub success_count: usize,
    /// `total - success_count`: exhausted retries, cancelled, or never started.
    pub failure_count: usize,
    pub completion: CompletionKind,
}

impl RefreshSummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            success_count: 0,
            failure_count: 0,
            completion: CompletionKind::Empty,
        }
    }
}

/// Everything a finished run hands back to its caller.
#[derive(Debug, Clone)]
pub struct RefreshReport {
    /// Successfully refreshed holdings keyed by holding id.
    pub updated: HashMap<Uuid, Holding>,
    pub summary: RefreshSummary,
    /// Final progress value emitted during the run.
    pub progress: RefreshProgress,
}

impl RefreshReport {
    pub fn empty() -> Self {
        Self {
            updated: HashMap::new(),
            summary: RefreshSummary::empty(),
            progress: RefreshProgress::start(0),
        }
    }
}

/// Events delivered through a channel-backed progress observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    Progress(RefreshProgress),
    Finished(RefreshSummary),
}
