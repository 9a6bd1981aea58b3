use serde::{Serialize, Deserialize};
use std::fmt;

pub type Height = u64;

/// Opaque block identifier. Only exact equality is meaningful to the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block(String);

impl Block {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Filler for a window slot whose height has no confirmed block yet.
    pub fn placeholder() -> Self {
        Self(String::new())
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Block {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Block {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Smallest vote count that is a strict majority of `n` voters.
pub fn majority_threshold(n: usize) -> usize {
    n / 2 + 1
}

/// Copy of the confirmed window and height handed out to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub blocks: Vec<Block>,
    pub height: Height,
}

impl ChainSnapshot {
    /// Height of `blocks[0]`. Equals `height + 1` when the window is empty.
    pub fn window_start(&self) -> Height {
        self.height.saturating_sub(self.blocks.len() as Height).saturating_add(1)
    }

    /// Block retained for `height`, placeholders included.
    pub fn block_at(&self, height: Height) -> Option<&Block> {
        if height == 0 || height > self.height || height < self.window_start() {
            return None;
        }
        self.blocks.get((height - self.window_start()) as usize)
    }

    pub fn into_parts(self) -> (Vec<Block>, Height) {
        (self.blocks, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_threshold() {
        assert_eq!(majority_threshold(0), 1);
        assert_eq!(majority_threshold(1), 1);
        assert_eq!(majority_threshold(2), 2);
        assert_eq!(majority_threshold(4), 3);
        assert_eq!(majority_threshold(5), 3);
        assert_eq!(majority_threshold(6), 4);
    }

    #[test]
    fn test_snapshot_lookup() {
        let snap = ChainSnapshot {
            blocks: vec!["C".into(), Block::placeholder(), "E".into()],
            height: 5,
        };
        assert_eq!(snap.window_start(), 3);
        assert_eq!(snap.block_at(3), Some(&Block::from("C")));
        assert!(snap.block_at(4).map(Block::is_placeholder).unwrap_or(false));
        assert_eq!(snap.block_at(5), Some(&Block::from("E")));
        assert_eq!(snap.block_at(2), None);
        assert_eq!(snap.block_at(6), None);
        assert_eq!(snap.block_at(0), None);
    }

    #[test]
    fn test_block_serde_transparent() {
        let json = serde_json::to_string(&Block::from("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "abc");
    }
}
