//! Memory access traits for the physical bus.
//!
//! This module defines the `MemoryAccess` trait implemented by every addressable component:
//! RAM, peripherals, the address router and the caches. It provides:
//! 1. **Word Access:** `read_word`/`write_word`, the primitives every implementor supplies.
//! 2. **Sub-word Access:** Big-endian byte and half-word access built on the word primitives
//!    with a side-effect-free read-modify-write.
//! 3. **Classification:** `LocationStatus` for read-only or illegal device registers.
//! 4. **External Changes:** `ExternalChange` records for state changed outside a core access.

use serde::Serialize;

use crate::common::Address;

/// Access classification of a location inside a backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum LocationStatus {
    /// Ordinary read-write location.
    #[default]
    None,
    /// Writes are ignored.
    ReadOnly,
    /// Not mapped inside the device window.
    Illegal,
}

/// A change to backend state made outside a core-initiated write.
///
/// Addresses are relative to the backend's base until the router translates them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExternalChange {
    /// First changed byte.
    pub start: u64,
    /// Last changed byte (inclusive).
    pub last: u64,
}

/// Trait for word-addressed memory and memory-mapped devices.
///
/// All multi-byte values are big-endian. Implementors supply the aligned word
/// primitives; sub-word accessors are derived from them.
pub trait MemoryAccess {
    /// Reads the aligned word containing `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the access (low two bits ignored).
    /// * `debug` - `true` for side-effect-free inspection reads (trace, dumps, RMW).
    fn read_word(&mut self, addr: Address, debug: bool) -> u32;

    /// Writes the aligned word containing `addr`.
    ///
    /// # Returns
    ///
    /// `true` if the stored content changed.
    fn write_word(&mut self, addr: Address, value: u32) -> bool;

    /// Reads one byte.
    fn read_byte(&mut self, addr: Address, debug: bool) -> u8 {
        let word = self.read_word(addr.align_down(4), debug);
        (word >> byte_shift(addr)) as u8
    }

    /// Reads one big-endian half-word (low address bit ignored).
    fn read_half(&mut self, addr: Address, debug: bool) -> u16 {
        let word = self.read_word(addr.align_down(4), debug);
        (word >> half_shift(addr)) as u16
    }

    /// Writes one byte by merging it into the containing word.
    fn write_byte(&mut self, addr: Address, value: u8) -> bool {
        let aligned = addr.align_down(4);
        let shift = byte_shift(addr);
        let old = self.read_word(aligned, true);
        let merged = (old & !(0xFF << shift)) | (u32::from(value) << shift);
        self.write_word(aligned, merged)
    }

    /// Writes one big-endian half-word by merging it into the containing word.
    fn write_half(&mut self, addr: Address, value: u16) -> bool {
        let aligned = addr.align_down(4);
        let shift = half_shift(addr);
        let old = self.read_word(aligned, true);
        let merged = (old & !(0xFFFF << shift)) | (u32::from(value) << shift);
        self.write_word(aligned, merged)
    }

    /// Classifies the location at `addr`.
    fn location_status(&self, _addr: Address) -> LocationStatus {
        LocationStatus::None
    }
}

/// Bit position of the byte at `addr` inside its big-endian word.
pub const fn byte_shift(addr: Address) -> u32 {
    (3 - (addr.val() & 3) as u32) * 8
}

/// Bit position of the half-word at `addr` inside its big-endian word.
pub const fn half_shift(addr: Address) -> u32 {
    (2 - (addr.val() & 2) as u32) * 8
}
