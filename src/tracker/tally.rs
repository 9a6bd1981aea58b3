//! Per-height vote counting.

use crate::tracker::types::{Block, Height};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
pub struct VoteTally {
    /// height -> (block value -> votes seen)
    by_height: BTreeMap<Height, HashMap<Block, usize>>,
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one vote and return the new total for `block` at `height`.
    pub fn record(&mut self, height: Height, block: &Block) -> usize {
        let bucket = self.by_height.entry(height).or_default();
        let count = bucket.entry(block.clone()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn votes(&self, height: Height, block: &Block) -> usize {
        self.by_height
            .get(&height)
            .and_then(|b| b.get(block))
            .copied()
            .unwrap_or(0)
    }

    /// Drop every bucket below `height`. Returns how many buckets went away.
    pub fn prune_below(&mut self, height: Height) -> usize {
        let kept = self.by_height.split_off(&height);
        let removed = self.by_height.len();
        self.by_height = kept;
        removed
    }

    pub fn tracked_heights(&self) -> usize {
        self.by_height.len()
    }

    pub fn clear(&mut self) {
        self.by_height.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_per_value() {
        let mut t = VoteTally::new();
        let a = Block::from("A");
        let b = Block::from("B");

        assert_eq!(t.record(1, &a), 1);
        assert_eq!(t.record(1, &a), 2);
        assert_eq!(t.record(1, &b), 1);
        assert_eq!(t.record(2, &a), 1);

        assert_eq!(t.votes(1, &a), 2);
        assert_eq!(t.votes(1, &b), 1);
        assert_eq!(t.votes(3, &a), 0);
        assert_eq!(t.tracked_heights(), 2);
    }

    #[test]
    fn test_prune_below() {
        let mut t = VoteTally::new();
        for h in 1..=5 {
            t.record(h, &Block::from("X"));
        }
        assert_eq!(t.prune_below(4), 3);
        assert_eq!(t.tracked_heights(), 2);
        assert_eq!(t.votes(3, &Block::from("X")), 0);
        assert_eq!(t.votes(4, &Block::from("X")), 1);
        assert_eq!(t.prune_below(1), 0);

        t.clear();
        assert_eq!(t.tracked_heights(), 0);
    }
}
