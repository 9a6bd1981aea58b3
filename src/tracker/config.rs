use crate::tracker::window::DEFAULT_WINDOW_CAPACITY;
use crate::utils::errors::{Result, TrackerError};
use serde::{Serialize, Deserialize};
use std::time::Duration;

/// Tuning knobs for a `BlockTracker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Most recent confirmed blocks kept in memory.
    pub window_capacity: usize,
    /// Forget vote buckets for heights that fell out of the window.
    pub prune_stale_tallies: bool,
    /// Upper bound on the bootstrap peer fan-out. `None` waits for every peer.
    pub bootstrap_timeout_ms: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            prune_stale_tallies: true,
            bootstrap_timeout_ms: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_capacity == 0 {
            return Err(TrackerError::Config("window_capacity must be at least 1".into()));
        }
        if self.bootstrap_timeout_ms == Some(0) {
            return Err(TrackerError::Config("bootstrap_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn bootstrap_timeout(&self) -> Option<Duration> {
        self.bootstrap_timeout_ms.map(Duration::from_millis)
    }
}
