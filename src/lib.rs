//! blockwatch: local majority-vote view of a block sequence reported by peers.
//!
//! - tracker: BlockTracker, confirmed window, vote tally, config
//! - peer: the peer capability and an in-memory peer
//! - node: demo host wiring (config file, CLI)
//! - utils: errors, logging, metrics

pub mod tracker;
pub mod peer;
pub mod node;
pub mod utils;

pub use peer::{Peer, PeerView, StaticPeer};
pub use tracker::config::TrackerConfig;
pub use tracker::types::{majority_threshold, Block, ChainSnapshot, Height};
pub use tracker::{BlockTracker, BootstrapOutcome};
pub use utils::errors::{Result, TrackerError};
