use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::Holding;

/// Long-lived owner of holding records.
///
/// A refresh run reads the collection with `list`, then calls `apply_updates`
/// exactly once with every successful result and finally `persist`.
pub trait HoldingsStore: Send + Sync {
    /// Snapshot of every holding, in storage order.
    fn list(&self) -> Result<Vec<Holding>, CoreError>;

    /// Apply refreshed market data by holding id. Ids missing from the store
    /// are skipped and holdings missing from `updates` are left untouched.
    /// Returns the number of holdings changed.
    fn apply_updates(&mut self, updates: &HashMap<Uuid, Holding>) -> Result<usize, CoreError>;

    /// Write pending changes to the backing medium.
    fn persist(&mut self) -> Result<(), CoreError>;

    /// Look up one holding by id.
    fn get(&self, id: Uuid) -> Result<Option<Holding>, CoreError> {
        Ok(self.list()?.into_iter().find(|h| h.id == id))
    }
}

/// Merge market data from `updates` into `holdings` in place.
pub(crate) fn merge_updates(holdings: &mut [Holding], updates: &HashMap<Uuid, Holding>) -> usize {
    let mut applied = 0;
    for holding in holdings.iter_mut() {
        if let Some(update) = updates.get(&holding.id) {
            holding.merge_market_data(update);
            applied += 1;
        }
    }
    applied
}
