//! Peer capability consumed by the tracker.
//!
//! A peer only has to answer "what is your current tip?". Transport, retries and
//! reachability live behind the implementation; an unreachable peer should answer
//! with an empty view instead of failing.

use crate::tracker::types::{Block, Height};
use serde::{Serialize, Deserialize};
use parking_lot::RwLock;

/// One peer's report of its chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerView {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub height: Height,
}

impl PeerView {
    pub fn new(blocks: Vec<Block>, height: Height) -> Self {
        Self { blocks, height }
    }

    /// Height agrees with the number of reported blocks.
    pub fn is_consistent(&self) -> bool {
        self.height == self.blocks.len() as Height
    }
}

/// Source of chain views. Called from several threads at once during bootstrap.
pub trait Peer: Send + Sync + 'static {
    fn tip(&self) -> PeerView;
}

/// In-memory peer answering with whatever view it was last given.
#[derive(Debug, Default)]
pub struct StaticPeer {
    view: RwLock<PeerView>,
}

impl StaticPeer {
    pub fn new(view: PeerView) -> Self {
        Self { view: RwLock::new(view) }
    }

    pub fn from_ids(ids: &[&str], height: Height) -> Self {
        Self::new(PeerView::new(ids.iter().map(|s| Block::from(*s)).collect(), height))
    }

    pub fn set_view(&self, view: PeerView) {
        *self.view.write() = view;
    }
}

impl Peer for StaticPeer {
    fn tip(&self) -> PeerView {
        self.view.read().clone()
    }
}
