//! Physical System Memory (RAM).
//!
//! This module implements the main memory backend. Storage is sparse: the address
//! space is split into 4 KiB sections that are allocated on the first write that
//! stores a non-zero value. Unwritten memory reads as zero.

use std::collections::HashMap;

use crate::common::Address;
use crate::soc::traits::MemoryAccess;

/// Words per allocated section.
const SECTION_WORDS: usize = 1024;

/// Bytes per allocated section.
const SECTION_BYTES: u64 = (SECTION_WORDS * 4) as u64;

/// Sparse word-addressed RAM.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    sections: HashMap<u64, Box<[u32; SECTION_WORDS]>>,
    change_counter: u64,
}

impl Memory {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sections currently allocated.
    pub fn allocated_sections(&self) -> usize {
        self.sections.len()
    }

    /// Number of writes that changed the stored content.
    pub const fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// Drops every section, returning memory to all zeros.
    pub fn reset(&mut self) {
        self.sections.clear();
    }

    /// Splits an address into section number and word index.
    const fn locate(addr: Address) -> (u64, usize) {
        let a = addr.val();
        (a / SECTION_BYTES, ((a % SECTION_BYTES) / 4) as usize)
    }
}

impl MemoryAccess for Memory {
    fn read_word(&mut self, addr: Address, _debug: bool) -> u32 {
        let (section, index) = Self::locate(addr);
        self.sections.get(&section).map_or(0, |s| s[index])
    }

    fn write_word(&mut self, addr: Address, value: u32) -> bool {
        let (section, index) = Self::locate(addr);
        let changed = match self.sections.get_mut(&section) {
            Some(s) => std::mem::replace(&mut s[index], value) != value,
            None if value == 0 => false,
            None => {
                let mut s = Box::new([0u32; SECTION_WORDS]);
                s[index] = value;
                let _ = self.sections.insert(section, s);
                true
            }
        };
        if changed {
            self.change_counter += 1;
        }
        changed
    }
}
