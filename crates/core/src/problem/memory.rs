use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tiles on the Memory Matrix grid (3×3).
pub const MATRIX_TILES: u8 = 9;
const TILE_REVEAL_MS: u64 = 800;
const MATRIX_SETTLE_MS: u64 = 500;
const DIGIT_REVEAL_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallKind {
    /// Distinct tile positions `0..9`.
    Tiles,
    /// Digits `1..=9`, repeats allowed.
    Digits,
}

/// A sequence shown during the reveal phase and repeated back afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallSequence {
    kind: RecallKind,
    items: Vec<u8>,
}

impl RecallSequence {
    /// Memory Matrix: `min(2 + level, 9)` distinct tiles.
    pub fn tiles<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Self {
        let len = (2 + level as usize).min(usize::from(MATRIX_TILES));
        let mut tiles: Vec<u8> = (0..MATRIX_TILES).collect();
        tiles.shuffle(rng);
        tiles.truncate(len);
        Self {
            kind: RecallKind::Tiles,
            items: tiles,
        }
    }

    /// Memory Numbers: `2 + level` digits.
    pub fn digits<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Self {
        let len = 2 + level as usize;
        Self {
            kind: RecallKind::Digits,
            items: (0..len).map(|_| rng.random_range(1..=9)).collect(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> RecallKind {
        self.kind
    }

    #[must_use]
    pub fn items(&self) -> &[u8] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// How long input stays locked while the sequence is shown.
    #[must_use]
    pub fn reveal_ms(&self) -> u64 {
        let n = self.items.len() as u64;
        match self.kind {
            RecallKind::Tiles => n * TILE_REVEAL_MS + MATRIX_SETTLE_MS,
            RecallKind::Digits => n * DIGIT_REVEAL_MS,
        }
    }

    /// Whether `entered` is a correct prefix of the sequence.
    #[must_use]
    pub fn matches_prefix(&self, entered: &[u8]) -> bool {
        entered.len() <= self.items.len() && self.items.starts_with(entered)
    }
}

impl fmt::Display for RecallSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown: Vec<String> = match self.kind {
            // tiles are shown 1-based, matching the grid labels
            RecallKind::Tiles => self.items.iter().map(|t| (t + 1).to_string()).collect(),
            RecallKind::Digits => self.items.iter().map(ToString::to_string).collect(),
        };
        write!(f, "{}", shown.join(" "))
    }
}
