//! MIPS32 Instruction Set Architecture.
//!
//! This module contains everything needed to turn instruction words into operations and
//! back. It includes:
//! 1. **Decoding:** The total `decode` function and its `Instruction` result.
//! 2. **Encoding:** Building words from operand fields.
//! 3. **Text:** Disassembly for traces and a matching single-line parser.

/// o32 register names.
pub mod abi;

/// Single-instruction text parser.
pub mod asm;

/// Instruction word decoder.
pub mod decode;

/// Assembly rendering.
pub mod disasm;

/// Instruction word encoder.
pub mod encode;

/// Field extraction and the `Opcode` table.
pub mod instruction;

/// Raw opcode, function and REGIMM values.
pub mod opcodes;

pub use decode::decode;
pub use encode::{Fields, encode};
pub use instruction::{Instruction, InstructionBits, Opcode, OperationKind};
