use crate::tracker::types::Height;
use thiserror::Error;

/// Unified error type for the tracker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("majority height does not match the number of blocks, height: {height}, len(blocks): {len}")]
    ConsistencyMismatch { height: Height, len: usize },

    #[error("peer query failed: {0}")]
    PeerQuery(String),

    #[error("bootstrap timed out after {0}ms")]
    BootstrapTimeout(u64),

    #[error("config error: {0}")]
    Config(String),
}

/// Convenience alias
pub type Result<T> = std::result::Result<T, TrackerError>;
