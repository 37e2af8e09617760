//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! Every access stamps the line with the value of a per-cache clock that starts at 1,
//! so a zero stamp identifies a slot never touched since reset or eviction.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `update()`: O(1)
//!   - `get_victim()`: O(W) where W is the number of ways (associativity)
//! - **Space Complexity:** O(S × W) where S is the number of sets

use super::{ReplacementPolicy, first_minimum};

/// LRU Policy state.
#[derive(Debug)]
pub struct LruPolicy {
    ways: usize,
    /// Last-access stamp per (set, way).
    stamps: Vec<u64>,
    clock: u64,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            ways,
            stamps: vec![0; sets * ways],
            clock: 1,
        }
    }
}

impl ReplacementPolicy for LruPolicy {
    fn update(&mut self, set: usize, way: usize) {
        self.stamps[set * self.ways + way] = self.clock;
        self.clock += 1;
    }

    fn invalidate(&mut self, set: usize, way: usize) {
        self.stamps[set * self.ways + way] = 0;
    }

    /// Returns the way with the oldest stamp.
    fn get_victim(&mut self, set: usize) -> usize {
        let base = set * self.ways;
        first_minimum(&self.stamps[base..base + self.ways])
    }

    fn reset(&mut self) {
        self.stamps.fill(0);
        self.clock = 1;
    }
}
