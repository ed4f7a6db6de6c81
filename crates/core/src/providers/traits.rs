use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::{CurrentInfo, TrailingReturns};

/// Source of fund market data, consumed by the refresh coordinator.
///
/// Both calls may fail with a transport error, and `fetch_current` may complete
/// normally with `is_valid == false` when the provider has no usable data.
/// The coordinator treats both cases as retryable.
#[async_trait]
pub trait FundDataFetcher: Send + Sync {
    /// Human-readable name of this fetcher (for logs/errors).
    fn name(&self) -> &str;

    /// Latest NAV, NAV date and fund name for a fund code.
    async fn fetch_current(&self, fund_code: &str) -> Result<CurrentInfo, CoreError>;

    /// Trailing 1m/3m/6m/1y returns. Only called after a valid `fetch_current`.
    async fn fetch_trailing_returns(&self, fund_code: &str) -> Result<TrailingReturns, CoreError>;
}
