use std::collections::HashMap;
use uuid::Uuid;

use super::traits::{merge_updates, HoldingsStore};
use crate::errors::CoreError;
use crate::models::holding::Holding;

/// Holdings kept in memory only. `persist` just counts calls.
#[derive(Debug, Default, Clone)]
pub struct MemoryHoldingsStore {
    holdings: Vec<Holding>,
    apply_count: usize,
    persist_count: usize,
}

impl MemoryHoldingsStore {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self {
            holdings,
            apply_count: 0,
            persist_count: 0,
        }
    }

    /// Add a holding after validating it.
    pub fn insert(&mut self, holding: Holding) -> Result<(), CoreError> {
        holding.validate()?;
        self.holdings.push(holding);
        Ok(())
    }

    /// How many times `apply_updates` was called.
    pub fn apply_count(&self) -> usize {
        self.apply_count
    }

    /// How many times `persist` was called.
    pub fn persist_count(&self) -> usize {
        self.persist_count
    }
}

impl HoldingsStore for MemoryHoldingsStore {
    fn list(&self) -> Result<Vec<Holding>, CoreError> {
        Ok(self.holdings.clone())
    }

    fn apply_updates(&mut self, updates: &HashMap<Uuid, Holding>) -> Result<usize, CoreError> {
        self.apply_count += 1;
        Ok(merge_updates(&mut self.holdings, updates))
    }

    fn persist(&mut self) -> Result<(), CoreError> {
        self.persist_count += 1;
        Ok(())
    }
}
