//! Exception causes and error types.
//!
//! This module defines the error handling vocabulary of the simulator. It provides:
//! 1. **Exception Causes:** Tags carried through the pipeline and committed in the memory stage.
//! 2. **Decode Errors:** The value returned for unsupported instruction encodings.
//! 3. **Setup Errors:** Configuration, address-map and host I/O failures.
//!
//! Runtime conditions inside a cycle are values (`ExceptionCause`, `bool`, zero reads).
//! Only setup paths outside of the step function return `Result`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::addr::Address;

/// Cause of a pipeline exception.
///
/// A cause is attached to the instruction that raised it and travels with it until the
/// commit stage, where the configured `ExceptionPolicy` decides what happens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionCause {
    /// No exception.
    #[default]
    None,
    /// External interrupt taken at the commit point.
    Interrupt,
    /// Instruction word did not decode.
    UnsupportedInstruction,
    /// Instruction decoded but the ALU cannot perform its operation.
    UnsupportedAluOperation,
    /// Signed arithmetic overflow (ADD, ADDI, SUB).
    Overflow,
    /// Data access at an address not aligned to its width.
    UnalignedAddress,
    /// Register jump to an address that is not word aligned.
    UnalignedJump,
    /// SYSCALL instruction.
    Syscall,
    /// BREAK instruction.
    Break,
}

impl ExceptionCause {
    /// Number of distinct causes, including `None`.
    pub const COUNT: usize = 9;

    /// Every cause in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::None,
        Self::Interrupt,
        Self::UnsupportedInstruction,
        Self::UnsupportedAluOperation,
        Self::Overflow,
        Self::UnalignedAddress,
        Self::UnalignedJump,
        Self::Syscall,
        Self::Break,
    ];

    /// Position of the cause in per-cause tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns `true` for every cause except `None`.
    pub const fn is_some(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns `true` for `None`.
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable upper-case name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Interrupt => "INT",
            Self::UnsupportedInstruction => "UNSUPPORTED_INSN",
            Self::UnsupportedAluOperation => "UNSUPPORTED_ALU_OP",
            Self::Overflow => "OVERFLOW",
            Self::UnalignedAddress => "UNALIGNED_ADDR",
            Self::UnalignedJump => "UNALIGNED_JUMP",
            Self::Syscall => "SYSCALL",
            Self::Break => "BREAK",
        }
    }

    /// Architectural exception code reported in `Cause.ExcCode`.
    ///
    /// Address errors report the load/fetch code; the memory stage switches to the
    /// store code for stores.
    pub const fn exc_code(self) -> u32 {
        match self {
            Self::None | Self::Interrupt => 0,
            Self::UnalignedAddress | Self::UnalignedJump => 4,
            Self::Syscall => 8,
            Self::Break => 9,
            Self::UnsupportedInstruction | Self::UnsupportedAluOperation => 10,
            Self::Overflow => 12,
        }
    }
}

impl fmt::Display for ExceptionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to decode an instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Reserved or unimplemented opcode/function combination.
    #[error("unsupported instruction 0x{code:08x}")]
    UnsupportedInstruction {
        /// The raw instruction word.
        code: u32,
    },
}

/// Failure to parse an assembly line back into an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Mnemonic is not part of the supported instruction set.
    #[error("unknown mnemonic `{0}`")]
    UnknownMnemonic(String),
    /// Operand count or syntax does not match the mnemonic.
    #[error("malformed operands for `{mnemonic}`: {text}")]
    Operands {
        /// Mnemonic being parsed.
        mnemonic: String,
        /// Offending operand text.
        text: String,
    },
}

/// Invalid machine or cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A cache description string has the wrong number of fields.
    #[error("cache configuration `{0}` must be policy,sets,blocksize,assoc[,writepolicy]")]
    CacheFieldCount(String),
    /// Unknown replacement policy name.
    #[error("unknown cache replacement policy `{0}`")]
    ReplacementPolicy(String),
    /// Unknown write policy name.
    #[error("unknown cache write policy `{0}`")]
    WritePolicy(String),
    /// Unknown hazard unit name.
    #[error("unknown hazard unit `{0}`")]
    HazardUnit(String),
    /// A numeric field could not be parsed or was zero.
    #[error("invalid cache {field} `{value}`")]
    Number {
        /// Name of the offending field.
        field: &'static str,
        /// Text that failed to parse.
        value: String,
    },
    /// Cache geometry does not fit the 32-bit address space.
    #[error("cache geometry {sets}x{blocks}x{ways} is too large")]
    Geometry {
        /// Number of sets.
        sets: u32,
        /// Words per line.
        blocks: u32,
        /// Associativity.
        ways: u32,
    },
}

/// Rejected address-space registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AddressSpaceError {
    /// The range intersects an already registered range.
    #[error("range {start}..={last} overlaps an existing mapping")]
    Overlap {
        /// First byte of the rejected range.
        start: Address,
        /// Last byte of the rejected range.
        last: Address,
    },
    /// The range ends before it starts.
    #[error("range {start}..={last} is empty")]
    InvalidRange {
        /// First byte of the rejected range.
        start: Address,
        /// Last byte of the rejected range.
        last: Address,
    },
}

/// Top-level error for host-facing operations (configuration files, images, dumps).
#[derive(Debug, Error)]
pub enum SimError {
    /// File system failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON configuration.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Semantically invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Address map could not be built.
    #[error(transparent)]
    AddressSpace(#[from] AddressSpaceError),
    /// Malformed or unsupported ELF executable.
    #[error("ELF error: {0}")]
    Elf(String),
}
