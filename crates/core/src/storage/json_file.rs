use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use super::traits::{merge_updates, HoldingsStore};
use crate::errors::CoreError;
use crate::models::holding::Holding;

/// Holdings stored as a pretty-printed JSON array in a single file.
///
/// The file is read once on open. `persist` only writes when something changed,
/// via a sibling temp file that is renamed over the target so a crash never
/// leaves a half-written file behind.
#[derive(Debug)]
pub struct JsonFileHoldingsStore {
    path: PathBuf,
    holdings: Vec<Holding>,
    /// Tracks whether any mutation has occurred since the last load/persist.
    dirty: bool,
}

impl JsonFileHoldingsStore {
    /// Open `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let holdings = if path.exists() {
            let bytes = std::fs::read(&path)?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Vec::new()
            } else {
                let holdings: Vec<Holding> = serde_json::from_slice(&bytes).map_err(|e| {
                    CoreError::Deserialization(format!(
                        "Failed to read holdings from {}: {e}",
                        path.display()
                    ))
                })?;
                holdings
            }
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), count = holdings.len(), "Loaded holdings");
        Ok(Self {
            path,
            holdings,
            dirty: false,
        })
    }

    /// Add a holding after validating it.
    pub fn insert(&mut self, holding: Holding) -> Result<(), CoreError> {
        holding.validate()?;
        self.holdings.push(holding);
        self.dirty = true;
        Ok(())
    }

    /// Remove a holding by id.
    pub fn remove(&mut self, id: Uuid) -> Result<Holding, CoreError> {
        let idx = self
            .holdings
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))?;
        self.dirty = true;
        Ok(self.holdings.remove(idx))
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }
}

impl HoldingsStore for JsonFileHoldingsStore {
    fn list(&self) -> Result<Vec<Holding>, CoreError> {
        Ok(self.holdings.clone())
    }

    fn apply_updates(&mut self, updates: &HashMap<Uuid, Holding>) -> Result<usize, CoreError> {
        let applied = merge_updates(&mut self.holdings, updates);
        if applied > 0 {
            self.dirty = true;
        }
        Ok(applied)
    }

    fn persist(&mut self) -> Result<(), CoreError> {
        if !self.dirty {
            return Ok(());
        }

        let json = serde_json::to_vec_pretty(&self.holdings)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize holdings: {e}")))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        self.dirty = false;
        debug!(path = %self.path.display(), count = self.holdings.len(), "Persisted holdings");
        Ok(())
    }
}
