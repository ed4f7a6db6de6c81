use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::CoreError;

/// Default number of holdings refreshed at once.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;
/// Default number of fetch attempts per holding.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default linear backoff step between attempts.
pub const DEFAULT_BACKOFF_STEP_MS: u64 = 500;

/// User-configurable settings. Every section falls back to its defaults
/// when missing from a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub refresh: RefreshSettings,
    pub provider: ProviderSettings,
    pub view_cache: ViewCacheSettings,
}

impl Settings {
    /// Parse settings from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make a refresh impossible.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.refresh.validate()?;
        self.provider.validate()?;
        self.view_cache.validate()
    }
}

/// Knobs for the refresh pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshSettings {
    /// Maximum number of holdings fetched concurrently.
    pub concurrency_limit: usize,
    /// Total attempts per holding, including the first one.
    pub max_attempts: u32,
    /// Wait before attempt `n` is `n * backoff_step_ms`.
    pub backoff_step_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_step_ms: DEFAULT_BACKOFF_STEP_MS,
        }
    }
}

impl RefreshSettings {
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.concurrency_limit == 0 {
            return Err(CoreError::InvalidConfig(
                "refresh.concurrency_limit must be at least 1".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(CoreError::InvalidConfig(
                "refresh.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Remote fund data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ProviderSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.base_url.trim().is_empty() {
            return Err(CoreError::InvalidConfig("provider.base_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(CoreError::InvalidConfig(
                "provider.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Size limits for memoized holding views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewCacheSettings {
    pub capacity: usize,
    /// How many of the oldest entries are dropped once `capacity` is exceeded.
    pub evict_count: usize,
}

impl Default for ViewCacheSettings {
    fn default() -> Self {
        Self {
            capacity: 20,
            evict_count: 10,
        }
    }
}

impl ViewCacheSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.capacity == 0 {
            return Err(CoreError::InvalidConfig("view_cache.capacity must be at least 1".into()));
        }
        if self.evict_count == 0 || self.evict_count > self.capacity {
            return Err(CoreError::InvalidConfig(format!(
                "view_cache.evict_count must be between 1 and {}, got {}",
                self.capacity, self.evict_count
            )));
        }
        Ok(())
    }
}
