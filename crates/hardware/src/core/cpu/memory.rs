//! Memory Access Helpers.
//!
//! This module provides the interface between the core and the memory subsystem.
//! It performs the following:
//! 1. **Cache Hierarchy:** Routes fetches through the program cache and data accesses
//!    through the data cache, both backed by the unified level-2 cache and the bus.
//! 2. **Access Shaping:** Applies width, sign extension and partial-word merges via the LSU.
//! 3. **Host Access:** Loads images and dumps ranges with the caches kept coherent.
//! 4. **Latency Accounting:** Exposes the cache statistics the reports are built from.

use tracing::debug;

use crate::common::{AccessControl, Address};
use crate::config::MachineConfig;
use crate::core::units::cache::{Cache, CacheTiming, CachedLevel};
use crate::core::units::lsu::Lsu;
use crate::soc::interconnect::PhysAddrSpace;
use crate::soc::traits::MemoryAccess;

/// Router plus L1 program, L1 data and unified L2 caches.
#[derive(Debug)]
pub struct MemorySystem {
    /// Physical address space.
    pub bus: PhysAddrSpace,
    /// Level-1 program cache.
    pub icache: Cache,
    /// Level-1 data cache.
    pub dcache: Cache,
    /// Unified level-2 cache.
    pub l2: Cache,
}

impl MemorySystem {
    /// Builds the cache hierarchy in front of `bus`.
    ///
    /// The level-1 caches are charged the level-2 latency when the level-2 cache is
    /// enabled and main memory latency otherwise.
    pub fn new(bus: PhysAddrSpace, config: &MachineConfig) -> Self {
        let memory = CacheTiming::main_memory(&config.memory_timing);
        let l1 = if config.cache_level2.enabled {
            CacheTiming::level2(&config.memory_timing)
        } else {
            memory
        };
        Self {
            bus,
            icache: Cache::new(config.cache_program, l1),
            dcache: Cache::new(config.cache_data, l1),
            l2: Cache::new(config.cache_level2, memory),
        }
    }

    /// Runs `f` against the data path (L1d, L2, bus).
    fn with_data<R>(&mut self, f: impl FnOnce(&mut dyn MemoryAccess) -> R) -> R {
        let mut l2 = CachedLevel {
            cache: &mut self.l2,
            lower: &mut self.bus,
        };
        let mut l1 = CachedLevel {
            cache: &mut self.dcache,
            lower: &mut l2,
        };
        f(&mut l1)
    }

    /// Fetches an instruction word through the program cache.
    pub fn fetch_word(&mut self, pc: Address) -> u32 {
        let mut l2 = CachedLevel {
            cache: &mut self.l2,
            lower: &mut self.bus,
        };
        self.icache.read_word(&mut l2, pc, false)
    }

    /// Performs a data load.
    ///
    /// # Arguments
    ///
    /// * `addr` - Effective address.
    /// * `ctl` - Width, extension and merge mode.
    /// * `reg` - Old destination value, merged by LWL/LWR.
    pub fn read(&mut self, addr: Address, ctl: AccessControl, reg: u32) -> u32 {
        self.with_data(|mem| Lsu::load(mem, addr, ctl, reg))
    }

    /// Performs a data store.
    ///
    /// # Returns
    ///
    /// `true` if memory content changed.
    pub fn write(&mut self, addr: Address, ctl: AccessControl, value: u32) -> bool {
        self.with_data(|mem| Lsu::store(mem, addr, ctl, value))
    }

    /// Reads a word without side effects, seeing data still held in the caches.
    pub fn peek_word(&mut self, addr: Address) -> u32 {
        self.with_data(|mem| mem.read_word(addr.align_down(4), true))
    }

    /// Copies bytes into memory, bypassing the caches.
    ///
    /// Caches are flushed first so no stale line shadows the new content.
    pub fn write_bytes(&mut self, addr: Address, bytes: &[u8]) {
        self.flush_caches();
        debug!(%addr, len = bytes.len(), "writing image bytes");
        for (i, &byte) in bytes.iter().enumerate() {
            let _ = self.bus.write_byte(addr.wrapping_add(i as u64), byte);
        }
    }

    /// Reads `len` bytes through the data path without side effects.
    pub fn read_bytes(&mut self, addr: Address, len: usize) -> Vec<u8> {
        self.with_data(|mem| {
            (0..len)
                .map(|i| mem.read_byte(addr.wrapping_add(i as u64), true))
                .collect()
        })
    }

    /// Writes every dirty line back without invalidating.
    pub fn sync_caches(&mut self) {
        let mut l2 = CachedLevel {
            cache: &mut self.l2,
            lower: &mut self.bus,
        };
        self.icache.sync(&mut l2);
        self.dcache.sync(&mut l2);
        self.l2.sync(&mut self.bus);
    }

    /// Writes back and invalidates every level.
    pub fn flush_caches(&mut self) {
        let mut l2 = CachedLevel {
            cache: &mut self.l2,
            lower: &mut self.bus,
        };
        self.icache.flush(&mut l2);
        self.dcache.flush(&mut l2);
        self.l2.flush(&mut self.bus);
    }

    /// Invalidates every cache and clears its statistics without writing back.
    pub fn reset_caches(&mut self) {
        self.icache.reset();
        self.dcache.reset();
        self.l2.reset();
    }

    /// Cycles the core would have stalled on cache misses.
    pub const fn cache_stall_count(&self) -> u64 {
        self.icache.stall_count() + self.dcache.stall_count() + self.l2.stall_count()
    }

    /// Routes external backend changes to subscribers.
    pub fn poll_external_changes(&mut self) -> usize {
        self.bus.poll_external_changes()
    }
}
