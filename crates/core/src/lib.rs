pub mod cache;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use models::{
    holding::Holding,
    profit::{PortfolioTotals, ProfitResult},
    refresh::RefreshSummary,
    settings::Settings,
};
use providers::{http_fetcher::HttpFundDataFetcher, traits::FundDataFetcher};
use services::{
    profit_service::ProfitCalculator,
    progress::ProgressObserver,
    reconciliation_service::HoldingsRefresher,
    refresh_coordinator::RefreshCoordinator,
    view_service::{HoldingsView, SortKey},
};
use std::sync::Arc;
use storage::traits::HoldingsStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use errors::CoreError;

/// Main entry point for the Fund Refresh core library.
/// Owns the holdings store and every service needed to operate on it.
#[must_use]
pub struct FundTracker {
    store: Box<dyn HoldingsStore>,
    refresher: HoldingsRefresher,
    view: HoldingsView,
    profit_calculator: ProfitCalculator,
    settings: Settings,
}

impl std::fmt::Debug for FundTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FundTracker")
            .field("settings", &self.settings)
            .field("concurrency_limit", &self.refresher.coordinator().concurrency_limit())
            .field("cached_views", &self.view.cached_views())
            .finish()
    }
}

impl FundTracker {
    /// Build a tracker over `store`, fetching market data through `fetcher`.
    pub fn new(
        store: Box<dyn HoldingsStore>,
        fetcher: Arc<dyn FundDataFetcher>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let coordinator = RefreshCoordinator::from_settings(fetcher, &settings.refresh)?;
        Ok(Self {
            store,
            refresher: HoldingsRefresher::new(coordinator),
            view: HoldingsView::new(&settings.view_cache)?,
            profit_calculator: ProfitCalculator::new(),
            settings,
        })
    }

    /// Build a tracker that fetches from the HTTP provider named in `settings`.
    pub fn with_http_fetcher(
        store: Box<dyn HoldingsStore>,
        settings: Settings,
    ) -> Result<Self, CoreError> {
        let fetcher = Arc::new(HttpFundDataFetcher::from_settings(&settings.provider));
        Self::new(store, fetcher, settings)
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// All holdings, in storage order.
    pub fn holdings(&self) -> Result<Vec<Holding>, CoreError> {
        self.store.list()
    }

    /// A single holding by its ID.
    pub fn get_holding(&self, id: Uuid) -> Result<Holding, CoreError> {
        self.store
            .get(id)?
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))
    }

    /// Holdings ordered by `sort`, optionally restricted to one client.
    /// Results are memoized until the next refresh.
    pub fn sorted_holdings(
        &mut self,
        sort: SortKey,
        client: Option<&str>,
    ) -> Result<Vec<Holding>, CoreError> {
        let holdings = self.store.list()?;
        Ok(self.view.sorted(&holdings, sort, client))
    }

    // ── Profit ──────────────────────────────────────────────────────

    /// Absolute and annualized profit of one holding at its last known NAV.
    pub fn profit_for(&self, id: Uuid) -> Result<ProfitResult, CoreError> {
        let holding = self.get_holding(id)?;
        Ok(self.profit_calculator.calculate(&holding))
    }

    /// Totals across every holding in the store.
    pub fn portfolio_totals(&self) -> Result<PortfolioTotals, CoreError> {
        let holdings = self.store.list()?;
        Ok(self.profit_calculator.totals(&holdings))
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Refresh market data for every holding and reconcile the results into
    /// the store in one batch. Progress and the final summary go to `observer`.
    pub async fn refresh_all(
        &mut self,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Result<RefreshSummary, CoreError> {
        let report = self
            .refresher
            .refresh(self.store.as_mut(), observer, cancel)
            .await?;
        self.view.invalidate();
        Ok(report.summary)
    }

    /// Give the store back, e.g. to inspect it after a refresh.
    pub fn into_store(self) -> Box<dyn HoldingsStore> {
        self.store
    }
}
