//! Cache Replacement Policies.
//!
//! Implements the algorithms for selecting victim lines in set-associative caches.
//! Metadata for every policy lives in one flat vector of `sets * ways` entries
//! indexed by `set * ways + way`.
//!
//! # Policies
//!
//! - `Random`: Pseudo-random selection from a seeded generator.
//! - `Lru`: Least Recently Used (access timestamps).
//! - `Lfu`: Least Frequently Used (access counters).

/// Least Frequently Used replacement policy.
pub mod lfu;

/// Least Recently Used replacement policy.
pub mod lru;

/// Random replacement policy.
pub mod random;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use random::RandomPolicy;

use crate::config::ReplacementPolicy as PolicyType;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage state and selecting victim lines.
pub trait ReplacementPolicy: Send + Sync {
    /// Updates the policy state when a line is accessed (hit or fill).
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn update(&mut self, set: usize, way: usize);

    /// Clears the metadata of a line that was evicted.
    fn invalidate(&mut self, _set: usize, _way: usize) {}

    /// Selects a victim line to evict from a specific set.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn get_victim(&mut self, set: usize) -> usize;

    /// Clears all metadata.
    fn reset(&mut self);
}

/// Builds the policy selected in a cache configuration.
pub fn build(kind: PolicyType, sets: usize, ways: usize) -> Box<dyn ReplacementPolicy> {
    match kind {
        PolicyType::Random => Box::new(RandomPolicy::new(sets, ways)),
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Lfu => Box::new(LfuPolicy::new(sets, ways)),
    }
}

/// Returns the way with the smallest metadata value in one set.
///
/// A zero entry marks a slot that was never used since the last invalidation
/// and wins immediately; otherwise the first minimum wins.
pub(crate) fn first_minimum(set_meta: &[u64]) -> usize {
    let mut best = 0;
    for (way, &value) in set_meta.iter().enumerate() {
        if value == 0 {
            return way;
        }
        if value < set_meta[best] {
            best = way;
        }
    }
    best
}
