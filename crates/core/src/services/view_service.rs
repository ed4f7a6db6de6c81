use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

use super::profit_service::ProfitCalculator;
use crate::cache::BoundedCache;
use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::settings::ViewCacheSettings;

/// Orderings offered for holding lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    /// Client name, A→Z
    ClientName,
    /// Fund code, A→Z
    FundCode,
    /// Market value, largest first
    TotalValue,
    /// Absolute profit, largest first
    Profit,
    /// Annualized return, largest first
    AnnualizedReturn,
    /// NAV date, newest first
    NavDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ViewKey {
    sort: SortKey,
    client: Option<String>,
}

/// Sorted and client-filtered holding lists, memoized per query.
///
/// Cached entries only hold ids, so they stay valid while the set of holdings
/// is unchanged. Call `invalidate` whenever holdings change (the facade does
/// this after every refresh).
pub struct HoldingsView {
    cache: BoundedCache<ViewKey, Vec<Uuid>>,
    calculator: ProfitCalculator,
}

impl HoldingsView {
    pub fn new(settings: &ViewCacheSettings) -> Result<Self, CoreError> {
        Ok(Self {
            cache: BoundedCache::from_settings(settings)?,
            calculator: ProfitCalculator::new(),
        })
    }

    /// Holdings matching `client` (case-insensitive, all if `None`) ordered by `sort`.
    pub fn sorted(
        &mut self,
        holdings: &[Holding],
        sort: SortKey,
        client: Option<&str>,
    ) -> Vec<Holding> {
        let key = ViewKey {
            sort,
            client: client.map(|c| c.trim().to_lowercase()),
        };

        let ids = match self.cache.get(&key) {
            Some(ids) => ids.clone(),
            None => {
                let ids = self.compute(holdings, &key);
                self.cache.insert(key, ids.clone());
                ids
            }
        };

        let by_id: HashMap<Uuid, &Holding> = holdings.iter().map(|h| (h.id, h)).collect();
        ids.iter()
            .filter_map(|id| by_id.get(id).map(|h| (*h).clone()))
            .collect()
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Number of memoized queries.
    pub fn cached_views(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, holdings: &[Holding], key: &ViewKey) -> Vec<Uuid> {
        let mut selected: Vec<&Holding> = holdings
            .iter()
            .filter(|h| match &key.client {
                Some(client) => h.client_name.trim().to_lowercase() == *client,
                None => true,
            })
            .collect();

        selected.sort_by(|a, b| self.compare(a, b, key.sort));
        selected.into_iter().map(|h| h.id).collect()
    }

    fn compare(&self, a: &Holding, b: &Holding, sort: SortKey) -> Ordering {
        match sort {
            SortKey::ClientName => a.client_name.cmp(&b.client_name),
            SortKey::FundCode => a.fund_code.cmp(&b.fund_code),
            SortKey::TotalValue => b.total_value().total_cmp(&a.total_value()),
            SortKey::Profit => self
                .calculator
                .calculate(b)
                .absolute
                .total_cmp(&self.calculator.calculate(a).absolute),
            SortKey::AnnualizedReturn => self
                .calculator
                .calculate(b)
                .annualized
                .total_cmp(&self.calculator.calculate(a).annualized),
            SortKey::NavDate => b.nav_date.cmp(&a.nav_date),
        }
    }
}
