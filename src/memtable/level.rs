//! Random lane heights for skip-list nodes.

use rand::Rng;

/// Default inverse probability of promoting a node one more lane
pub const DEFAULT_SKIP_FACTOR: u32 = 2;

/// Generates node heights from a geometric distribution capped at `max_level`
#[derive(Debug, Clone, Copy)]
pub struct LevelGenerator {
    max_level: usize,
    skip_factor: u32,
}

impl LevelGenerator {
    pub fn new(max_level: usize) -> Self {
        Self::with_skip_factor(max_level, DEFAULT_SKIP_FACTOR)
    }

    pub fn with_skip_factor(max_level: usize, skip_factor: u32) -> Self {
        Self {
            max_level: max_level.max(1),
            skip_factor: skip_factor.max(2),
        }
    }

    /// Height in `1..=max_level`; each extra lane is taken with probability 1/skip_factor
    pub fn generate(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut level = 1;
        while level < self.max_level && rng.gen_ratio(1, self.skip_factor) {
            level += 1;
        }
        level
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }
}
