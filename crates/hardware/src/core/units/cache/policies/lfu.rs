//! Least Frequently Used (LFU) Replacement Policy.
//!
//! This policy evicts the cache line with the fewest accesses since it was filled.
//! Counters are reset to zero when a line is evicted.

use super::{ReplacementPolicy, first_minimum};

/// LFU Policy state.
#[derive(Debug)]
pub struct LfuPolicy {
    ways: usize,
    /// Access count per (set, way).
    counts: Vec<u64>,
}

impl LfuPolicy {
    /// Creates a new LFU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            ways,
            counts: vec![0; sets * ways],
        }
    }
}

impl ReplacementPolicy for LfuPolicy {
    fn update(&mut self, set: usize, way: usize) {
        let slot = &mut self.counts[set * self.ways + way];
        *slot = slot.saturating_add(1);
    }

    fn invalidate(&mut self, set: usize, way: usize) {
        self.counts[set * self.ways + way] = 0;
    }

    fn get_victim(&mut self, set: usize) -> usize {
        let base = set * self.ways;
        first_minimum(&self.counts[base..base + self.ways])
    }

    fn reset(&mut self) {
        self.counts.fill(0);
    }
}
