use std::time::Duration;

use crate::errors::CoreError;
use crate::models::settings::{RefreshSettings, DEFAULT_BACKOFF_STEP_MS, DEFAULT_MAX_ATTEMPTS};

/// Decides how often a holding's fetch is attempted and how long to wait in between.
///
/// Attempts are indexed from 0. The wait before attempt `n` is `n * step`,
/// so there is no wait before the first attempt and the waits grow linearly
/// (0.5s then 1.0s with the defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_step: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Result<Self, CoreError> {
        if max_attempts == 0 {
            return Err(CoreError::InvalidConfig(
                "A retry policy needs at least one attempt".into(),
            ));
        }
        Ok(Self {
            max_attempts,
            backoff_step,
        })
    }

    pub fn from_settings(settings: &RefreshSettings) -> Result<Self, CoreError> {
        Self::new(settings.max_attempts, settings.backoff_step())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt may follow the failed attempt `attempt_index`.
    pub fn should_retry(&self, attempt_index: u32) -> bool {
        attempt_index + 1 < self.max_attempts
    }

    /// Wait before starting attempt `attempt_index`.
    pub fn backoff(&self, attempt_index: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt_index)
    }

    /// Sum of every wait a fully failing holding goes through.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|i| self.backoff(i))
            .fold(Duration::ZERO, |acc, d| acc.saturating_add(d))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_step: Duration::from_millis(DEFAULT_BACKOFF_STEP_MS),
        }
    }
}
