//! Load/Store Unit (LSU).
//!
//! This module provides the Load/Store Unit, responsible for shaping data memory
//! accesses. It includes:
//! - [`unaligned`]: Alignment checks and the LWL/LWR/SWL/SWR merge rules.
//!
//! The LSU works on any [`MemoryAccess`], so the same code runs against the bare
//! router or a cache hierarchy.

/// Alignment checks and partial-word merges.
pub mod unaligned;

use crate::common::{AccessControl, Address};
use crate::soc::traits::MemoryAccess;

/// Load/Store Unit for data memory operations.
#[derive(Debug)]
pub struct Lsu;

impl Lsu {
    /// Performs a load.
    ///
    /// # Arguments
    ///
    /// * `mem` - The memory to read.
    /// * `addr` - Effective address.
    /// * `ctl` - Width, extension and merge mode.
    /// * `reg` - Current value of the destination register (merged by LWL/LWR).
    ///
    /// # Returns
    ///
    /// The value to write into the destination register.
    pub fn load(mem: &mut dyn MemoryAccess, addr: Address, ctl: AccessControl, reg: u32) -> u32 {
        match ctl {
            AccessControl::None => 0,
            AccessControl::Byte => mem.read_byte(addr, false) as i8 as i32 as u32,
            AccessControl::ByteUnsigned => u32::from(mem.read_byte(addr, false)),
            AccessControl::Half => mem.read_half(addr, false) as i16 as i32 as u32,
            AccessControl::HalfUnsigned => u32::from(mem.read_half(addr, false)),
            AccessControl::Word => mem.read_word(addr, false),
            AccessControl::WordLeft => {
                let word = mem.read_word(addr.align_down(4), false);
                unaligned::load_left(word, reg, addr)
            }
            AccessControl::WordRight => {
                let word = mem.read_word(addr.align_down(4), false);
                unaligned::load_right(word, reg, addr)
            }
        }
    }

    /// Performs a store.
    ///
    /// # Arguments
    ///
    /// * `mem` - The memory to write.
    /// * `addr` - Effective address.
    /// * `ctl` - Width and merge mode.
    /// * `value` - Source register value.
    ///
    /// # Returns
    ///
    /// `true` if memory content changed.
    pub fn store(mem: &mut dyn MemoryAccess, addr: Address, ctl: AccessControl, value: u32) -> bool {
        match ctl {
            AccessControl::None => false,
            AccessControl::Byte | AccessControl::ByteUnsigned => mem.write_byte(addr, value as u8),
            AccessControl::Half | AccessControl::HalfUnsigned => {
                mem.write_half(addr, value as u16)
            }
            AccessControl::Word => mem.write_word(addr, value),
            AccessControl::WordLeft => {
                let aligned = addr.align_down(4);
                let old = mem.read_word(aligned, true);
                mem.write_word(aligned, unaligned::store_left(old, value, addr))
            }
            AccessControl::WordRight => {
                let aligned = addr.align_down(4);
                let old = mem.read_word(aligned, true);
                mem.write_word(aligned, unaligned::store_right(old, value, addr))
            }
        }
    }
}
