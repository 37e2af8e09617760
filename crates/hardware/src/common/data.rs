//! Register values and memory access descriptors.
//!
//! This module defines the plain data carried between the register file, the ALU and the
//! memory system. It provides:
//! 1. **Register Values:** An opaque bit pattern with explicit signed/unsigned views.
//! 2. **Access Types:** Classification of accesses into fetch, read and write.
//! 3. **Access Control:** Width, signedness and unaligned-merge mode of a data access.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-width register bit pattern.
///
/// Equality is bitwise. No arithmetic is defined on the value itself; the ALU
/// interprets it through the explicit accessors below.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterValue(u64);

impl RegisterValue {
    /// The all-zero value.
    pub const ZERO: Self = Self(0);

    /// Creates a register value from a raw 64-bit pattern.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Low 32 bits, unsigned.
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Low 32 bits, signed.
    #[inline(always)]
    pub const fn as_i32(self) -> i32 {
        self.0 as u32 as i32
    }

    /// Full 64-bit pattern, unsigned.
    #[inline(always)]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Full 64-bit pattern, signed.
    #[inline(always)]
    pub const fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl From<u32> for RegisterValue {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

impl From<i32> for RegisterValue {
    fn from(value: i32) -> Self {
        Self(u64::from(value as u32))
    }
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessType {
    /// Instruction fetch through the program cache.
    Fetch,
    /// Data load through the data cache.
    Read,
    /// Data store through the data cache.
    Write,
}

/// Width, extension and merge mode of a data memory access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessControl {
    /// No memory access.
    #[default]
    None,
    /// Signed byte.
    Byte,
    /// Signed half-word.
    Half,
    /// Full word.
    Word,
    /// Zero-extended byte.
    ByteUnsigned,
    /// Zero-extended half-word.
    HalfUnsigned,
    /// Most-significant part of an unaligned word (LWL/SWL).
    WordLeft,
    /// Least-significant part of an unaligned word (LWR/SWR).
    WordRight,
}

impl AccessControl {
    /// Required natural alignment in bytes. Unaligned-merge modes accept any address.
    pub const fn alignment(self) -> u64 {
        match self {
            Self::Half | Self::HalfUnsigned => 2,
            Self::Word => 4,
            _ => 1,
        }
    }
}
