use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::progress::ProgressObserver;
use super::retry_policy::RetryPolicy;
use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::refresh::{
    CompletionKind, RefreshOutcome, RefreshProgress, RefreshReport, RefreshSummary,
};
use crate::models::settings::{RefreshSettings, DEFAULT_CONCURRENCY_LIMIT};
use crate::providers::traits::FundDataFetcher;

/// Refreshes market data for a batch of holdings with bounded concurrency.
///
/// A run walks the input in order, keeping at most `concurrency_limit`
/// fetch-with-retry sequences in flight. Outcomes are handled one at a time by
/// a single completion loop, which is the only place that advances progress and
/// records successes, so neither needs a lock.
///
/// The coordinator never writes to a store. The caller gets the map of updated
/// holdings back and reconciles it in one step (see `HoldingsRefresher`).
pub struct RefreshCoordinator {
    fetcher: Arc<dyn FundDataFetcher>,
    policy: RetryPolicy,
    concurrency_limit: usize,
    running: AtomicBool,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("policy", &self.policy)
            .field("concurrency_limit", &self.concurrency_limit)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Coordinator with the default retry policy and a concurrency limit of 3.
    pub fn new(fetcher: Arc<dyn FundDataFetcher>) -> Self {
        Self {
            fetcher,
            policy: RetryPolicy::default(),
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            running: AtomicBool::new(false),
        }
    }

    pub fn from_settings(
        fetcher: Arc<dyn FundDataFetcher>,
        settings: &RefreshSettings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Self::new(fetcher)
            .with_retry_policy(RetryPolicy::from_settings(settings)?)
            .with_concurrency_limit(settings.concurrency_limit)
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Result<Self, CoreError> {
        if limit == 0 {
            return Err(CoreError::InvalidConfig(
                "Concurrency limit must be at least 1".into(),
            ));
        }
        self.concurrency_limit = limit;
        Ok(self)
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// True while a `run` on this coordinator has not returned yet.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Refresh every holding in `holdings` and return the successful updates.
    ///
    /// Emits `(0, total)` first, then exactly one progress tick per holding as
    /// it finishes, however many attempts it took. Per-holding failures are only
    /// counted, never returned as errors. Cancelling `cancel` stops new launches
    /// and retries; in-flight attempts finish but their results are dropped.
    ///
    /// Fails with `RefreshInProgress` if another run on this coordinator is active.
    pub async fn run(
        &self,
        holdings: &[Holding],
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<RefreshReport, CoreError> {
        let _guard = RunGuard::acquire(&self.running)?;

        let total = holdings.len();
        let mut progress = RefreshProgress::start(total);
        observer.on_progress(progress);

        if total == 0 {
            debug!("No holdings to refresh");
            return Ok(RefreshReport::empty());
        }

        info!(
            total,
            concurrency_limit = self.concurrency_limit,
            fetcher = self.fetcher.name(),
            "Starting fund data refresh"
        );

        let mut pending = holdings.iter();
        let mut in_flight: FuturesUnordered<BoxFuture<'_, RefreshOutcome>> =
            FuturesUnordered::new();
        let mut updated: HashMap<Uuid, Holding> = HashMap::new();
        let mut interrupted = false;

        if !cancel.is_cancelled() {
            for holding in pending.by_ref().take(self.concurrency_limit) {
                in_flight.push(self.refresh_one(holding, cancel).boxed());
            }
        }

        while let Some(outcome) = in_flight.next().await {
            progress.advance();
            observer.on_progress(progress);

            match outcome {
                RefreshOutcome::Updated(holding) => {
                    updated.insert(holding.id, holding);
                }
                RefreshOutcome::Failed {
                    fund_code,
                    attempts,
                    reason,
                    ..
                } => {
                    warn!(%fund_code, attempts, %reason, "Giving up on holding refresh");
                }
                RefreshOutcome::Cancelled { holding_id } => {
                    debug!(%holding_id, "Holding refresh dropped after cancellation");
                    interrupted = true;
                }
            }

            if cancel.is_cancelled() {
                continue;
            }
            if let Some(next) = pending.next() {
                in_flight.push(self.refresh_one(next, cancel).boxed());
            }
        }

        if !pending.as_slice().is_empty() {
            interrupted = true;
        }

        let success_count = updated.len();
        let summary = RefreshSummary {
            total,
            success_count,
            failure_count: total - success_count,
            completion: if interrupted {
                CompletionKind::Cancelled
            } else {
                CompletionKind::Finished
            },
        };

        info!(
            success = summary.success_count,
            failed = summary.failure_count,
            completion = %summary.completion,
            "Fund data refresh finished"
        );

        Ok(RefreshReport {
            updated,
            summary,
            progress,
        })
    }

    /// One holding's fetch-with-retry sequence.
    async fn refresh_one(&self, holding: &Holding, cancel: &CancellationToken) -> RefreshOutcome {
        let mut attempt: u32 = 0;
        loop {
            if attempt > 0 {
                let wait = self.policy.backoff(attempt);
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return RefreshOutcome::Cancelled { holding_id: holding.id };
                    }
                    _ = tokio::time::sleep(wait) => {}
                }
            }

            let result = self.fetch_holding(holding).await;

            // The attempt was allowed to finish, but nothing it produced is kept.
            if cancel.is_cancelled() {
                return RefreshOutcome::Cancelled {
                    holding_id: holding.id,
                };
            }

            match result {
                Ok(refreshed) => {
                    debug!(fund_code = %holding.fund_code, attempt, "Holding refreshed");
                    return RefreshOutcome::Updated(refreshed);
                }
                Err(e) if self.policy.should_retry(attempt) => {
                    debug!(
                        fund_code = %holding.fund_code,
                        attempt,
                        error = %e,
                        "Refresh attempt failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => {
                    return RefreshOutcome::Failed {
                        holding_id: holding.id,
                        fund_code: holding.fund_code.clone(),
                        attempts: attempt + 1,
                        reason: e.to_string(),
                    };
                }
            }
        }
    }

    /// A single attempt: current data first, trailing returns only if it is valid.
    async fn fetch_holding(&self, holding: &Holding) -> Result<Holding, CoreError> {
        let current = self.fetcher.fetch_current(&holding.fund_code).await?;
        if !current.is_valid {
            return Err(CoreError::FundNotFound(holding.fund_code.clone()));
        }
        let returns = self
            .fetcher
            .fetch_trailing_returns(&holding.fund_code)
            .await?;
        Ok(holding.with_market_data(&current, &returns))
    }
}

/// Marks a coordinator as running for as long as it is alive.
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, CoreError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CoreError::RefreshInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
