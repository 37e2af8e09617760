//! Unaligned memory access handling.
//!
//! This module implements alignment checking and the big-endian merge rules of the
//! partial-word instructions LWL, LWR, SWL and SWR. Each helper takes the aligned
//! memory word, the register operand and the byte offset of the effective address.

use crate::common::{AccessControl, Address};

/// Checks whether an access of kind `ctl` at `addr` is naturally aligned.
///
/// # Arguments
///
/// * `addr` - The byte address of the access.
/// * `ctl` - Width of the access. Partial-word merges accept any address.
///
/// # Returns
///
/// `true` if the access is naturally aligned.
pub const fn is_aligned(addr: Address, ctl: AccessControl) -> bool {
    addr.is_aligned(ctl.alignment())
}

/// Byte offset of `addr` inside its word, as a bit count.
const fn offset_bits(addr: Address) -> u64 {
    (addr.val() & 3) * 8
}

/// LWL: loads the most-significant bytes of the register from `addr` up to the
/// end of the word.
pub const fn load_left(mem: u32, reg: u32, addr: Address) -> u32 {
    let sh = offset_bits(addr);
    let keep = ((1u64 << sh) - 1) as u32;
    (((mem as u64) << sh) as u32) | (reg & keep)
}

/// LWR: loads the least-significant bytes of the register from the start of the
/// word up to `addr`.
pub const fn load_right(mem: u32, reg: u32, addr: Address) -> u32 {
    let sh = 24 - offset_bits(addr);
    let loaded = (u32::MAX as u64 >> sh) as u32;
    (mem >> sh) | (reg & !loaded)
}

/// SWL: stores the most-significant bytes of the register from `addr` up to the
/// end of the word.
pub const fn store_left(mem: u32, reg: u32, addr: Address) -> u32 {
    let sh = offset_bits(addr);
    let stored = (u32::MAX as u64 >> sh) as u32;
    (mem & !stored) | ((reg as u64 >> sh) as u32)
}

/// SWR: stores the least-significant bytes of the register from the start of the
/// word up to `addr`.
pub const fn store_right(mem: u32, reg: u32, addr: Address) -> u32 {
    let sh = 24 - offset_bits(addr);
    let keep = ((1u64 << sh) - 1) as u32;
    (((reg as u64) << sh) as u32) | (mem & keep)
}
