use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::fs;
use std::sync::Arc;

use crate::peer::{Peer, PeerView, StaticPeer};
use crate::tracker::config::TrackerConfig;
use crate::tracker::types::{Block, Height};

/// A static peer declared in the demo config.
#[derive(Debug, Deserialize, Clone)]
pub struct PeerEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub height: Height,
}

/// One candidate batch. Batches sharing a wave are ingested concurrently.
#[derive(Debug, Deserialize, Clone)]
pub struct BatchEntry {
    #[serde(default)]
    pub wave: u32,
    pub start: Height,
    pub blocks: Vec<Block>,
}

/// Demo configuration: tracker settings, a fixed peer set and batches to replay.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DemoConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub peers: Vec<PeerEntry>,
    #[serde(default)]
    pub batches: Vec<BatchEntry>,
}

impl DemoConfig {
    /// Load demo config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let cfg: DemoConfig = toml::from_str(data)?;
        cfg.tracker.validate()?;
        Ok(cfg)
    }

    pub fn build_peers(&self) -> Vec<Arc<dyn Peer>> {
        self.peers
            .iter()
            .map(|p| {
                Arc::new(StaticPeer::new(PeerView::new(p.blocks.clone(), p.height))) as Arc<dyn Peer>
            })
            .collect()
    }

    /// Display names in peer order; unnamed peers get `peer<index>`.
    pub fn peer_names(&self) -> Vec<String> {
        self.peers
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.name.is_empty() {
                    format!("peer{}", i)
                } else {
                    p.name.clone()
                }
            })
            .collect()
    }

    /// Batches grouped by wave, in ascending wave order.
    pub fn waves(&self) -> Vec<(u32, Vec<BatchEntry>)> {
        let mut grouped: BTreeMap<u32, Vec<BatchEntry>> = BTreeMap::new();
        for b in &self.batches {
            grouped.entry(b.wave).or_default().push(b.clone());
        }
        grouped.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[tracker]
window_capacity = 10

[[peers]]
name = "p1"
blocks = ["A", "B"]
height = 2

[[peers]]
blocks = []

[[batches]]
wave = 2
start = 3
blocks = ["C"]

[[batches]]
wave = 1
start = 3
blocks = ["X"]

[[batches]]
wave = 2
start = 3
blocks = ["C"]
"#;

    #[test]
    fn test_parse_sample() {
        let cfg = DemoConfig::parse(SAMPLE).unwrap();
        assert_eq!(cfg.tracker.window_capacity, 10);
        assert!(cfg.tracker.prune_stale_tallies);
        assert_eq!(cfg.peers.len(), 2);
        assert_eq!(cfg.peers[0].name, "p1");
        assert_eq!(cfg.peers[1].height, 0);
        assert_eq!(cfg.peer_names(), vec!["p1".to_string(), "peer1".to_string()]);

        let peers = cfg.build_peers();
        assert_eq!(peers[0].tip(), PeerView::new(vec!["A".into(), "B".into()], 2));

        let waves = cfg.waves();
        assert_eq!(waves.len(), 2);
        assert_eq!(waves[0].0, 1);
        assert_eq!(waves[1].1.len(), 2);
    }

    #[test]
    fn test_parse_rejects_bad_tracker_config() {
        assert!(DemoConfig::parse("[tracker]\nwindow_capacity = 0\n").is_err());
    }
}
