//! Block tracker: majority-vote view of the most recent confirmed blocks.
//!
//! Public surface:
//! - BlockTracker: bootstrap from peers, ingest candidate batches, snapshot, reset
//! - types, window, tally, config

pub mod types;
pub mod window;
pub mod tally;
pub mod config;

use crate::peer::{Peer, PeerView};
use crate::tracker::config::TrackerConfig;
use crate::tracker::tally::VoteTally;
use crate::tracker::types::{majority_threshold, Block, ChainSnapshot, Height};
use crate::tracker::window::{ConfirmedWindow, Promotion};
use crate::utils::errors::{Result, TrackerError};
use crate::utils::metrics::{self, MetricsRegistry, METRICS};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of a bootstrap that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A majority agreed; its chain view is now the tracker state.
    Adopted { height: Height, retained: usize },
    /// No view reached the threshold; state is unchanged.
    NoMajority,
}

/// Window and tally form one consistency unit.
#[derive(Debug)]
struct TrackerState {
    window: ConfirmedWindow,
    tally: VoteTally,
}

impl TrackerState {
    fn new(capacity: usize) -> Self {
        Self {
            window: ConfirmedWindow::new(capacity),
            tally: VoteTally::new(),
        }
    }
}

/// BlockTracker owns the confirmed window for a fixed peer set.
pub struct BlockTracker {
    peers: Vec<Arc<dyn Peer>>,
    config: TrackerConfig,
    state: RwLock<TrackerState>,
    metrics: MetricsRegistry,
}

impl BlockTracker {
    /// Tracker with default config (window of 50, no bootstrap timeout).
    pub fn new(peers: Vec<Arc<dyn Peer>>) -> Self {
        let config = TrackerConfig::default();
        let state = RwLock::new(TrackerState::new(config.window_capacity));
        Self { peers, config, state, metrics: METRICS.clone() }
    }

    pub fn with_config(peers: Vec<Arc<dyn Peer>>, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let state = RwLock::new(TrackerState::new(config.window_capacity));
        Ok(Self { peers, config, state, metrics: METRICS.clone() })
    }

    /// Report into `registry` instead of the process-wide `METRICS`.
    pub fn with_metrics(mut self, registry: MetricsRegistry) -> Self {
        self.metrics = registry;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Votes needed at a height before its block is confirmed.
    pub fn threshold(&self) -> usize {
        majority_threshold(self.peers.len())
    }

    /// Poll every peer and adopt the first view backed by a majority.
    ///
    /// Views are compared whole (blocks and height). Responses are counted in
    /// peer order and the first view to reach the threshold wins. A winning view
    /// whose height differs from its block count is rejected and the current
    /// state is kept.
    pub async fn bootstrap(&self) -> Result<BootstrapOutcome> {
        let views = match self.config.bootstrap_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.poll_peers())
                .await
                .map_err(|_| TrackerError::BootstrapTimeout(limit.as_millis() as u64))??,
            None => self.poll_peers().await?,
        };

        let threshold = self.threshold();
        let view = match select_majority(views, threshold) {
            Some(v) => v,
            None => {
                info!(peers = self.peers.len(), threshold, "bootstrap found no majority view");
                self.metrics.inc_counter(metrics::BOOTSTRAP_NO_MAJORITY);
                return Ok(BootstrapOutcome::NoMajority);
            }
        };

        if !view.is_consistent() {
            warn!(height = view.height, len = view.blocks.len(), "majority view is inconsistent");
            self.metrics.inc_counter(metrics::BOOTSTRAP_MISMATCH);
            return Err(TrackerError::ConsistencyMismatch {
                height: view.height,
                len: view.blocks.len(),
            });
        }

        let height = view.height;
        let retained = {
            let mut guard = self.state.write();
            let st = &mut *guard;
            st.window.adopt(view.blocks, height);
            if self.config.prune_stale_tallies {
                st.tally.prune_below(st.window.start_height());
            }
            st.window.len()
        };

        info!(height, retained, "bootstrap adopted majority view");
        self.metrics.inc_counter(metrics::BOOTSTRAP_ADOPTED);
        self.metrics.set_gauge(metrics::CONFIRMED_HEIGHT, height as f64);
        Ok(BootstrapOutcome::Adopted { height, retained })
    }

    /// Query all peers concurrently; results keep peer order.
    async fn poll_peers(&self) -> Result<Vec<PeerView>> {
        let tasks = self.peers.iter().cloned().map(|peer| {
            tokio::task::spawn_blocking(move || peer.tip())
        });

        join_all(tasks)
            .await
            .into_iter()
            .enumerate()
            .map(|(i, res)| res.map_err(|e| TrackerError::PeerQuery(format!("peer {}: {}", i, e))))
            .collect()
    }

    /// Count `blocks[i]` as one vote for height `start_height + i` and confirm
    /// every block that reaches the threshold. The batch is applied atomically.
    /// Returns the confirmed height after the whole batch.
    pub fn process_blocks(&self, start_height: Height, blocks: &[Block]) -> Height {
        if blocks.is_empty() || start_height == 0 {
            return self.confirmed_height();
        }

        let threshold = self.threshold();
        let mut recorded = 0u64;
        let mut confirmed = 0u64;
        let mut dropped = 0u64;
        let mut lowest_dropped: Option<Height> = None;

        let mut guard = self.state.write();
        let st = &mut *guard;

        for (i, block) in blocks.iter().enumerate() {
            let height = match start_height.checked_add(i as Height) {
                Some(h) => h,
                None => {
                    warn!(start_height, index = i, "batch runs past the maximum height");
                    break;
                }
            };

            if self.config.prune_stale_tallies && height < st.window.start_height() {
                // bucket already pruned, the vote can only be dropped
                dropped += 1;
                lowest_dropped.get_or_insert(height);
                continue;
            }

            let votes = st.tally.record(height, block);
            recorded += 1;
            if votes < threshold {
                continue;
            }

            let first = votes == threshold;
            match st.window.promote(height, block.clone()) {
                Promotion::Dropped => {
                    if first {
                        dropped += 1;
                        lowest_dropped.get_or_insert(height);
                    }
                }
                Promotion::Advanced { previous } => {
                    if first {
                        debug!(height, previous, block = %block, "confirmed height advanced");
                        confirmed += 1;
                    }
                }
                Promotion::Overwritten => {
                    if first {
                        debug!(height, block = %block, "confirmed block inside the window");
                        confirmed += 1;
                    }
                }
            }
        }

        if self.config.prune_stale_tallies {
            st.tally.prune_below(st.window.start_height());
        }
        let height = st.window.height();
        let window_start = st.window.start_height();
        drop(guard);

        if let Some(lowest) = lowest_dropped {
            warn!(dropped, lowest, window_start, "late confirmations fell outside the window");
        }

        self.metrics.add_counter(metrics::VOTES_RECORDED, recorded);
        self.metrics.add_counter(metrics::BLOCKS_CONFIRMED, confirmed);
        self.metrics.add_counter(metrics::LATE_CONFIRMATIONS_DROPPED, dropped);
        self.metrics.set_gauge(metrics::CONFIRMED_HEIGHT, height as f64);
        height
    }

    /// Copy of the confirmed window and the confirmed height.
    pub fn get_blocks(&self) -> (Vec<Block>, Height) {
        self.snapshot().into_parts()
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        self.state.read().window.snapshot()
    }

    pub fn confirmed_height(&self) -> Height {
        self.state.read().window.height()
    }

    /// Heights that currently hold vote buckets.
    pub fn pending_heights(&self) -> usize {
        self.state.read().tally.tracked_heights()
    }

    /// Back to the empty state. The peer set is kept.
    pub fn reset(&self) {
        let mut guard = self.state.write();
        guard.window.clear();
        guard.tally.clear();
        drop(guard);

        info!("tracker reset");
        self.metrics.inc_counter(metrics::TRACKER_RESETS);
        self.metrics.set_gauge(metrics::CONFIRMED_HEIGHT, 0.0);
    }
}

/// First view, in response order, whose running count reaches `threshold`.
fn select_majority(mut views: Vec<PeerView>, threshold: usize) -> Option<PeerView> {
    let winner = {
        let mut counts: HashMap<&PeerView, usize> = HashMap::new();
        let mut winner = None;
        for (i, view) in views.iter().enumerate() {
            let c = counts.entry(view).or_insert(0);
            *c += 1;
            if *c >= threshold {
                winner = Some(i);
                break;
            }
        }
        winner
    };
    winner.map(|i| views.swap_remove(i))
}
