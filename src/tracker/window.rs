//! Bounded window of the most recent confirmed blocks.
//!
//! The window never stores heights explicitly: the newest slot always belongs to
//! `height` and slot 0 to `height - len + 1`. Heights inside the window that were
//! skipped over by a later confirmation hold a placeholder until confirmed.

use crate::tracker::types::{Block, ChainSnapshot, Height};
use std::collections::VecDeque;

pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// What a promotion did to the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// Confirmed height moved forward to the promoted height.
    Advanced { previous: Height },
    /// An already-covered slot was rewritten in place.
    Overwritten,
    /// The height was trimmed out of the window; nothing changed.
    Dropped,
}

#[derive(Debug, Clone)]
pub struct ConfirmedWindow {
    blocks: VecDeque<Block>,
    height: Height,
    capacity: usize,
}

impl ConfirmedWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            blocks: VecDeque::with_capacity(capacity),
            height: 0,
            capacity,
        }
    }

    pub fn height(&self) -> Height {
        self.height
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Height held by slot 0 (`height + 1` when empty).
    pub fn start_height(&self) -> Height {
        self.height.saturating_sub(self.blocks.len() as Height).saturating_add(1)
    }

    /// Slot index for `height`, if it is still retained.
    fn slot_of(&self, height: Height) -> Option<usize> {
        if height == 0 || height > self.height || height < self.start_height() {
            return None;
        }
        Some((height - self.start_height()) as usize)
    }

    pub fn get(&self, height: Height) -> Option<&Block> {
        self.slot_of(height).and_then(|i| self.blocks.get(i))
    }

    /// Record `block` as confirmed at `height`.
    pub fn promote(&mut self, height: Height, block: Block) -> Promotion {
        let outcome = if height > self.height {
            let previous = self.height;
            let gap = height - previous - 1;
            if gap >= self.capacity as Height {
                // every retained slot would be pushed out by the back-fill anyway
                self.blocks.clear();
                self.blocks
                    .extend(std::iter::repeat(Block::placeholder()).take(self.capacity - 1));
            } else {
                self.blocks
                    .extend(std::iter::repeat(Block::placeholder()).take(gap as usize));
            }
            self.blocks.push_back(block);
            self.height = height;
            Promotion::Advanced { previous }
        } else {
            match self.slot_of(height) {
                Some(i) => {
                    self.blocks[i] = block;
                    Promotion::Overwritten
                }
                None => Promotion::Dropped,
            }
        };

        self.trim();
        outcome
    }

    /// Replace the whole window with an adopted chain view. `height` is kept
    /// even when `blocks` is longer than the capacity.
    pub fn adopt(&mut self, blocks: Vec<Block>, height: Height) {
        let skip = blocks.len().saturating_sub(self.capacity);
        self.blocks = blocks.into_iter().skip(skip).collect();
        self.height = height;
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.height = 0;
    }

    fn trim(&mut self) {
        while self.blocks.len() > self.capacity {
            self.blocks.pop_front();
        }
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot {
            blocks: self.blocks.iter().cloned().collect(),
            height: self.height,
        }
    }
}

impl Default for ConfirmedWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(ids: &[&str]) -> Vec<Block> {
        ids.iter().map(|s| Block::from(*s)).collect()
    }

    #[test]
    fn test_promote_sequence() {
        let mut w = ConfirmedWindow::default();

        let cases: Vec<(&str, Height, Vec<Block>, Height)> = vec![
            ("A", 1, blocks(&["A"]), 1),
            ("B", 2, blocks(&["A", "B"]), 2),
            ("C", 3, blocks(&["A", "B", "C"]), 3),
            ("D", 5, blocks(&["A", "B", "C", "", "D"]), 5),
            ("E", 4, blocks(&["A", "B", "C", "E", "D"]), 5),
            ("F", 7, blocks(&["A", "B", "C", "E", "D", "", "F"]), 7),
        ];

        for (block, height, expect_blocks, expect_height) in cases {
            w.promote(height, block.into());
            let snap = w.snapshot();
            assert_eq!(snap.blocks, expect_blocks, "after confirming {}@{}", block, height);
            assert_eq!(snap.height, expect_height);
        }

        assert_eq!(
            w.promote(100, "Z".into()),
            Promotion::Advanced { previous: 7 }
        );
        let snap = w.snapshot();
        assert_eq!(snap.height, 100);
        assert_eq!(snap.blocks.len(), DEFAULT_WINDOW_CAPACITY);
        assert_eq!(snap.blocks[49], Block::from("Z"));
        assert!(snap.blocks[..49].iter().all(Block::is_placeholder));
    }

    #[test]
    fn test_fill_gap_in_place() {
        let mut w = ConfirmedWindow::default();
        w.promote(3, "C".into());
        assert_eq!(w.snapshot().blocks, blocks(&["", "", "C"]));

        assert_eq!(w.promote(1, "A".into()), Promotion::Overwritten);
        assert_eq!(w.promote(2, "B".into()), Promotion::Overwritten);
        assert_eq!(w.snapshot().blocks, blocks(&["A", "B", "C"]));
        assert_eq!(w.height(), 3);
    }

    #[test]
    fn test_late_confirmation_outside_window_dropped() {
        let mut w = ConfirmedWindow::new(3);
        for (h, b) in [(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E")] {
            w.promote(h, b.into());
        }
        assert_eq!(w.snapshot().blocks, blocks(&["C", "D", "E"]));
        assert_eq!(w.start_height(), 3);

        assert_eq!(w.promote(2, "X".into()), Promotion::Dropped);
        assert_eq!(w.snapshot().blocks, blocks(&["C", "D", "E"]));

        assert_eq!(w.promote(3, "Y".into()), Promotion::Overwritten);
        assert_eq!(w.snapshot().blocks, blocks(&["Y", "D", "E"]));
    }

    #[test]
    fn test_huge_jump_is_bounded() {
        let mut w = ConfirmedWindow::new(4);
        w.promote(1, "A".into());
        w.promote(u64::MAX - 1, "Z".into());
        let snap = w.snapshot();
        assert_eq!(snap.height, u64::MAX - 1);
        assert_eq!(snap.blocks, blocks(&["", "", "", "Z"]));
        assert_eq!(w.get(u64::MAX - 1), Some(&Block::from("Z")));
    }

    #[test]
    fn test_gap_equal_to_capacity_matches_step_by_step() {
        let mut fast = ConfirmedWindow::new(3);
        fast.promote(1, "A".into());
        fast.promote(5, "E".into());

        let mut slow = ConfirmedWindow::new(3);
        slow.promote(1, "A".into());
        for h in 2..5 {
            slow.promote(h, Block::placeholder());
        }
        slow.promote(5, "E".into());

        assert_eq!(fast.snapshot(), slow.snapshot());
    }

    #[test]
    fn test_adopt_keeps_height_and_trims() {
        let mut w = ConfirmedWindow::new(2);
        w.adopt(blocks(&["A", "B", "C"]), 3);
        assert_eq!(w.snapshot().blocks, blocks(&["B", "C"]));
        assert_eq!(w.height(), 3);
        assert_eq!(w.start_height(), 2);

        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.height(), 0);
        assert_eq!(w.start_height(), 1);
    }
}
