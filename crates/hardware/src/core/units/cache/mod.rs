//! Set-Associative Cache.
//!
//! This module implements a configurable set-associative, data-holding cache placed in
//! front of any [`MemoryAccess`] backend. It provides:
//! 1. **Lookup and Fill:** Word-addressed tag/set/column decomposition, whole-line refills
//!    and victim selection through a [`ReplacementPolicy`].
//! 2. **Write Policies:** Write-back, write-through with allocate, and write-through
//!    without allocate (write misses bypass the cache).
//! 3. **Statistics:** Hit/miss counters, memory traffic, stall estimate and speed-up.
//! 4. **Observation:** Optional per-line `CacheEvent` records for visualisation.
//!
//! The cache does not own the level below it; every access takes the lower level
//! as an argument so the same cache can sit in front of an L2 or the bus.

/// Cache replacement policy implementations (LRU, LFU, Random).
pub mod policies;

use serde::Serialize;
use tracing::{debug, trace};

use self::policies::ReplacementPolicy;
use crate::common::Address;
use crate::common::constants::{UNCACHED_LAST, UNCACHED_START};
use crate::config::{CacheConfig, MemoryTiming, WritePolicy};
use crate::soc::traits::{LocationStatus, MemoryAccess};

/// Access penalties charged by a cache's backing level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CacheTiming {
    /// Cycles per word read from the level below.
    pub read: u32,
    /// Cycles per word written to the level below.
    pub write: u32,
    /// Cycles per subsequent burst word.
    pub burst: u32,
    /// Account for bursts.
    pub burst_enable: bool,
}

impl CacheTiming {
    /// Penalties of a cache backed directly by main memory.
    pub const fn main_memory(timing: &MemoryTiming) -> Self {
        Self {
            read: timing.read,
            write: timing.write,
            burst: timing.burst,
            burst_enable: timing.burst_enable,
        }
    }

    /// Penalties of a level-1 cache backed by the level-2 cache.
    pub const fn level2(timing: &MemoryTiming) -> Self {
        Self {
            read: timing.level2,
            write: timing.level2,
            burst: 0,
            burst_enable: false,
        }
    }
}

/// Accumulated cache counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Read hits.
    pub hit_read: u64,
    /// Write hits.
    pub hit_write: u64,
    /// Read misses.
    pub miss_read: u64,
    /// Write misses.
    pub miss_write: u64,
    /// Words read from the level below.
    pub mem_reads: u64,
    /// Words written to the level below.
    pub mem_writes: u64,
    /// Words read as part of a burst (every word of a refill after the first).
    pub burst_reads: u64,
    /// Words written as part of a burst.
    pub burst_writes: u64,
    /// Writes that changed cached or backing content.
    pub change_counter: u64,
}

/// Notification of a cache line state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CacheEvent {
    /// The line at (`way`, `set`) now has the given state.
    Update {
        /// Way index.
        way: usize,
        /// Set index.
        set: usize,
        /// Line holds data.
        valid: bool,
        /// Line differs from the level below.
        dirty: bool,
        /// Tag of the held block.
        tag: u32,
    },
}

/// Per-line state.
#[derive(Clone, Copy, Debug, Default)]
struct CacheLine {
    tag: u32,
    valid: bool,
    dirty: bool,
}

/// Set-associative cache with data storage.
pub struct Cache {
    config: CacheConfig,
    timing: CacheTiming,
    /// Lines indexed by `set * ways + way`.
    lines: Vec<CacheLine>,
    /// `blocks` words per line, in line order.
    data: Vec<u32>,
    sets: usize,
    ways: usize,
    blocks: usize,
    policy: Box<dyn ReplacementPolicy>,
    stats: CacheStats,
    record_events: bool,
    events: Vec<CacheEvent>,
}

impl Cache {
    /// Creates a cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Geometry and policies; zero components are clamped to 1.
    /// * `timing` - Penalties of the level below, used by the statistics.
    ///
    /// # Returns
    ///
    /// A cache with every line invalid. A disabled configuration allocates no lines.
    pub fn new(config: CacheConfig, timing: CacheTiming) -> Self {
        let config = config.normalized();
        let sets = config.sets as usize;
        let ways = config.associativity as usize;
        let blocks = config.blocks as usize;
        let lines = if config.enabled { sets * ways } else { 0 };
        Self {
            config,
            timing,
            lines: vec![CacheLine::default(); lines],
            data: vec![0; lines * blocks],
            sets,
            ways,
            blocks,
            policy: policies::build(config.replacement, sets, ways),
            stats: CacheStats::default(),
            record_events: false,
            events: Vec::new(),
        }
    }

    /// Configuration this cache was built from.
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Penalties used by the statistics.
    pub const fn timing(&self) -> &CacheTiming {
        &self.timing
    }

    /// Returns `true` if the cache is enabled.
    pub const fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Returns `true` if accesses to `addr` go through the cache.
    pub const fn is_cacheable(&self, addr: Address) -> bool {
        self.config.enabled && !(addr.val() >= UNCACHED_START && addr.val() <= UNCACHED_LAST)
    }

    /// Returns `true` if `addr` skips the cache, either because it is not
    /// cacheable or because `lower` marks the location read-only or illegal.
    fn bypasses(&self, lower: &dyn MemoryAccess, addr: Address) -> bool {
        !self.is_cacheable(addr) || lower.location_status(addr) != LocationStatus::None
    }

    /// Enables or disables collection of [`CacheEvent`]s.
    pub fn set_record_events(&mut self, record: bool) {
        self.record_events = record;
        if !record {
            self.events.clear();
        }
    }

    /// Takes the events collected since the last call.
    pub fn drain_events(&mut self) -> Vec<CacheEvent> {
        std::mem::take(&mut self.events)
    }

    /// Splits an address into `(tag, set, column)`.
    const fn locate(&self, addr: Address) -> (u32, usize, usize) {
        let word = (addr.val() as u32 >> 2) as usize;
        let span = self.blocks * self.sets;
        let index = word % span;
        ((word / span) as u32, index / self.blocks, index % self.blocks)
    }

    /// Address of the first word of the block with `tag` in `set`.
    const fn base_address(&self, tag: u32, set: usize) -> Address {
        let span = (self.blocks * self.sets) as u64;
        Address::new(((tag as u64 * span + (set * self.blocks) as u64) << 2) & 0xFFFF_FFFF)
    }

    fn find_way(&self, tag: u32, set: usize) -> Option<usize> {
        let base = set * self.ways;
        (0..self.ways).find(|&way| {
            let line = &self.lines[base + way];
            line.valid && line.tag == tag
        })
    }

    /// Returns `true` if the block holding `addr` is resident.
    pub fn contains(&self, addr: Address) -> bool {
        if !self.is_cacheable(addr) {
            return false;
        }
        let (tag, set, _) = self.locate(addr);
        self.find_way(tag, set).is_some()
    }

    fn emit(&mut self, set: usize, way: usize) {
        if self.record_events {
            let line = self.lines[set * self.ways + way];
            self.events.push(CacheEvent::Update {
                way,
                set,
                valid: line.valid,
                dirty: line.dirty,
                tag: line.tag,
            });
        }
    }

    /// Evicts the line at (`set`, `way`), writing it back first when dirty under write-back.
    fn kick(&mut self, lower: &mut dyn MemoryAccess, set: usize, way: usize) {
        let idx = set * self.ways + way;
        let line = self.lines[idx];
        if line.dirty && self.config.write_policy == WritePolicy::WriteBack {
            let base = self.base_address(line.tag, set);
            debug!(%base, set, way, "writing back dirty line");
            for i in 0..self.blocks {
                let _ = lower.write_word(base + (i as u64) * 4, self.data[idx * self.blocks + i]);
            }
            self.stats.mem_writes += self.blocks as u64;
            self.stats.burst_writes += self.blocks as u64 - 1;
        }
        self.lines[idx] = CacheLine {
            valid: false,
            dirty: false,
            ..line
        };
        self.policy.invalidate(set, way);
        self.emit(set, way);
    }

    /// Locates or allocates the line holding `addr`, refilling it on a miss.
    ///
    /// # Returns
    ///
    /// The index of the first data word of the access, inside `self.data`.
    fn access(&mut self, lower: &mut dyn MemoryAccess, addr: Address, write: bool) -> usize {
        let (tag, set, col) = self.locate(addr);
        let base = set * self.ways;

        let way = if let Some(way) = self.find_way(tag, set) {
            if write {
                self.stats.hit_write += 1;
            } else {
                self.stats.hit_read += 1;
            }
            way
        } else {
            let way = match (0..self.ways).find(|&w| !self.lines[base + w].valid) {
                Some(free) => free,
                None => {
                    let victim = self.policy.get_victim(set);
                    self.kick(lower, set, victim);
                    victim
                }
            };
            if write {
                self.stats.miss_write += 1;
            } else {
                self.stats.miss_read += 1;
            }
            let block = self.base_address(tag, set);
            trace!(%block, set, way, "refilling line");
            let first = (base + way) * self.blocks;
            for i in 0..self.blocks {
                self.data[first + i] = lower.read_word(block + (i as u64) * 4, false);
            }
            self.stats.mem_reads += self.blocks as u64;
            self.stats.burst_reads += self.blocks as u64 - 1;
            self.lines[base + way] = CacheLine {
                tag,
                valid: true,
                dirty: false,
            };
            way
        };

        self.policy.update(set, way);
        (base + way) * self.blocks + col
    }

    /// Reads a word through the cache.
    ///
    /// # Arguments
    ///
    /// * `lower` - The level below.
    /// * `addr` - Address of the word.
    /// * `debug` - Side-effect-free read: no statistics, no refill.
    pub fn read_word(&mut self, lower: &mut dyn MemoryAccess, addr: Address, debug: bool) -> u32 {
        if self.bypasses(lower, addr) {
            if !debug {
                self.stats.miss_read += 1;
                self.stats.mem_reads += 1;
            }
            return lower.read_word(addr, debug);
        }
        if debug {
            let (tag, set, col) = self.locate(addr);
            return match self.find_way(tag, set) {
                Some(way) => self.data[(set * self.ways + way) * self.blocks + col],
                None => lower.read_word(addr, true),
            };
        }
        let idx = self.access(lower, addr, false);
        let (_, set, _) = self.locate(addr);
        let way = (idx / self.blocks) - set * self.ways;
        self.emit(set, way);
        self.data[idx]
    }

    /// Writes a word through the cache.
    ///
    /// # Returns
    ///
    /// `true` if the cached or backing content changed.
    pub fn write_word(&mut self, lower: &mut dyn MemoryAccess, addr: Address, value: u32) -> bool {
        if self.bypasses(lower, addr) {
            self.stats.miss_write += 1;
            self.stats.mem_writes += 1;
            return lower.write_word(addr, value);
        }
        let policy = self.config.write_policy;
        let (tag, set, _) = self.locate(addr);

        if policy == WritePolicy::WriteThroughNoAlloc && self.find_way(tag, set).is_none() {
            self.stats.miss_write += 1;
            self.stats.mem_writes += 1;
            let changed = lower.write_word(addr, value);
            if changed {
                self.stats.change_counter += 1;
            }
            return changed;
        }

        let idx = self.access(lower, addr, true);
        let way = (idx / self.blocks) - set * self.ways;
        let mut changed = std::mem::replace(&mut self.data[idx], value) != value;
        if policy.is_write_through() {
            self.stats.mem_writes += 1;
            changed |= lower.write_word(addr, value);
        } else {
            self.lines[set * self.ways + way].dirty = true;
        }
        if changed {
            self.stats.change_counter += 1;
        }
        self.emit(set, way);
        changed
    }

    /// Writes every dirty line back, leaving lines valid and clean.
    pub fn sync(&mut self, lower: &mut dyn MemoryAccess) {
        if self.config.write_policy != WritePolicy::WriteBack {
            return;
        }
        for idx in 0..self.lines.len() {
            let line = self.lines[idx];
            if line.valid && line.dirty {
                let (set, way) = (idx / self.ways, idx % self.ways);
                let base = self.base_address(line.tag, set);
                for i in 0..self.blocks {
                    let _ = lower.write_word(base + (i as u64) * 4, self.data[idx * self.blocks + i]);
                }
                self.stats.mem_writes += self.blocks as u64;
                self.stats.burst_writes += self.blocks as u64 - 1;
                self.lines[idx].dirty = false;
                self.emit(set, way);
            }
        }
    }

    /// Evicts every valid line, writing dirty ones back.
    pub fn flush(&mut self, lower: &mut dyn MemoryAccess) {
        for set in 0..self.sets {
            for way in 0..self.ways {
                if self.lines.get(set * self.ways + way).is_some_and(|l| l.valid) {
                    self.kick(lower, set, way);
                }
            }
        }
    }

    /// Invalidates every line and zeroes the statistics without writing anything back.
    ///
    /// An update event is recorded for every (way, set).
    pub fn reset(&mut self) {
        self.lines.fill(CacheLine::default());
        self.data.fill(0);
        self.policy.reset();
        self.stats = CacheStats::default();
        if self.config.enabled {
            for set in 0..self.sets {
                for way in 0..self.ways {
                    self.emit(set, way);
                }
            }
        }
    }

    /// Raw counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Read and write hits.
    pub const fn hits(&self) -> u64 {
        self.stats.hit_read + self.stats.hit_write
    }

    /// Read and write misses.
    pub const fn misses(&self) -> u64 {
        self.stats.miss_read + self.stats.miss_write
    }

    /// Estimated cycles stalled on misses.
    pub const fn stall_count(&self) -> u64 {
        self.stats.miss_read * (self.timing.read.saturating_sub(1) as u64)
            + self.stats.miss_write * (self.timing.write.saturating_sub(1) as u64)
    }

    /// Ratio of uncached latency to cached latency, in percent.
    pub fn speed_improvement(&self) -> f64 {
        let s = &self.stats;
        let accesses = s.hit_read + s.hit_write + s.miss_read + s.miss_write;
        if accesses == 0 || !self.config.enabled {
            return 100.0;
        }
        let (r, w, b) = (
            u64::from(self.timing.read),
            u64::from(self.timing.write),
            u64::from(self.timing.burst),
        );
        let mut lookup_time = s.hit_read + s.miss_read;
        if self.config.write_policy == WritePolicy::WriteBack {
            lookup_time += s.hit_write + s.miss_write;
        }
        let mut mem_access_time = s.mem_reads * r + s.mem_writes * w;
        if self.timing.burst_enable {
            mem_access_time = mem_access_time.saturating_sub(
                s.burst_reads * r.saturating_sub(b) + s.burst_writes * w.saturating_sub(b),
            );
        }
        let uncached = (s.miss_read + s.hit_read) * r + (s.miss_write + s.hit_write) * w;
        let cached = lookup_time + mem_access_time;
        if cached == 0 {
            return 100.0;
        }
        uncached as f64 / cached as f64 * 100.0
    }

    /// Hits as a percentage of all accesses (`0.0` before the first access).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64 * 100.0
        }
    }

    /// Hits as a percentage of all accesses, as shown in the cache report.
    ///
    /// Same value as [`hit_rate`](Self::hit_rate).
    pub fn usage_efficiency(&self) -> f64 {
        self.hit_rate()
    }

    /// Percentage of lines currently holding data.
    pub fn occupancy(&self) -> f64 {
        if self.lines.is_empty() {
            return 0.0;
        }
        let used = self.lines.iter().filter(|l| l.valid).count();
        used as f64 / self.lines.len() as f64 * 100.0
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// A cache paired with its lower level, usable wherever a [`MemoryAccess`] is expected.
///
/// Chaining `CachedLevel`s builds the L1 -> L2 -> bus hierarchy.
pub struct CachedLevel<'a> {
    /// The cache.
    pub cache: &'a mut Cache,
    /// The level below.
    pub lower: &'a mut dyn MemoryAccess,
}

impl std::fmt::Debug for CachedLevel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedLevel")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl MemoryAccess for CachedLevel<'_> {
    fn read_word(&mut self, addr: Address, debug: bool) -> u32 {
        self.cache.read_word(self.lower, addr, debug)
    }

    fn write_word(&mut self, addr: Address, value: u32) -> bool {
        self.cache.write_word(self.lower, addr, value)
    }

    fn location_status(&self, addr: Address) -> LocationStatus {
        self.lower.location_status(addr)
    }
}
