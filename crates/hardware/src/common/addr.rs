//! Simulated address type.
//!
//! This module defines the strong address type shared by the core, the caches and the
//! physical address space router. It provides:
//! 1. **Type Safety:** Keeps bus addresses apart from byte offsets and register values.
//! 2. **Arithmetic:** Wrapping offset arithmetic and alignment helpers.
//! 3. **Formatting:** Fixed-width hex rendering for traces and reports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// An address in the simulated physical address space.
///
/// The wrapped value is 64 bits wide so the type can back both 32-bit and 64-bit
/// machines; the MIPS32 core only ever constructs addresses from 32-bit values.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(u64);

impl Address {
    /// Creates a new address from a raw value.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw address value.
    #[inline(always)]
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// The all-zero address.
    #[inline(always)]
    pub const fn null() -> Self {
        Self(0)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u64 {
        self.0
    }

    /// Returns the low 32 bits of the address.
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Returns `true` if the address is a multiple of `align` (a power of two).
    pub const fn is_aligned(self, align: u64) -> bool {
        self.0 & (align - 1) == 0
    }

    /// Rounds the address down to a multiple of `align` (a power of two).
    pub const fn align_down(self, align: u64) -> Self {
        Self(self.0 & !(align - 1))
    }

    /// Adds a byte offset, wrapping on overflow.
    pub const fn wrapping_add(self, offset: u64) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Subtracts a byte offset, wrapping on underflow.
    pub const fn wrapping_sub(self, offset: u64) -> Self {
        Self(self.0.wrapping_sub(offset))
    }

    /// Returns the byte distance from `base` to `self`.
    ///
    /// # Arguments
    ///
    /// * `base` - Start of the window the offset is relative to.
    pub const fn offset_from(self, base: Self) -> u64 {
        self.0.wrapping_sub(base.0)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl Add<u64> for Address {
    type Output = Self;

    fn add(self, rhs: u64) -> Self {
        self.wrapping_add(rhs)
    }
}

impl AddAssign<u64> for Address {
    fn add_assign(&mut self, rhs: u64) {
        *self = self.wrapping_add(rhs);
    }
}

impl Sub<u64> for Address {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl Sub for Address {
    type Output = u64;

    fn sub(self, rhs: Self) -> u64 {
        self.offset_from(rhs)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
