//! Instruction disassembler.
//!
//! Renders decoded instructions in the syntax accepted by [`asm::parse`](crate::isa::asm::parse):
//! registers as `$n`, arithmetic immediates and memory offsets in signed decimal, logical
//! immediates in hex, and branch/jump targets as absolute hex addresses.

use std::fmt::Write as _;

use crate::common::Address;
use crate::isa::decode::decode;
use crate::isa::instruction::{Instruction, Opcode, Syntax};

/// Branch target for a PC-relative branch at `pc`.
pub fn branch_target(pc: Address, imm: u32) -> Address {
    let offset = imm.wrapping_shl(2);
    Address::from(pc.as_u32().wrapping_add(4).wrapping_add(offset))
}

/// Jump target for a J-type jump at `pc`.
pub fn jump_target(pc: Address, target26: u32) -> Address {
    let region = pc.as_u32().wrapping_add(4) & 0xF000_0000;
    Address::from(region | (target26 << 2))
}

impl Instruction {
    /// Renders the instruction as assembly text.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address of the instruction, used to resolve branch and jump targets.
    ///
    /// # Returns
    ///
    /// The mnemonic followed by its operands, or `nop` for the zero word.
    pub fn to_asm(&self, pc: Address) -> String {
        if self.is_nop() {
            return "nop".to_string();
        }
        let op = self.opcode();
        let mut out = String::from(op.mnemonic());
        let (rs, rt, rd) = (self.rs(), self.rt(), self.rd());
        // Writing into a String is infallible.
        let _ = match op.syntax() {
            Syntax::ShiftImmediate => write!(out, " ${rd}, ${rt}, {}", self.shamt()),
            Syntax::ShiftVariable => write!(out, " ${rd}, ${rt}, ${rs}"),
            Syntax::JumpRegister | Syntax::MoveTo => write!(out, " ${rs}"),
            Syntax::JumpRegisterLink => write!(out, " ${rd}, ${rs}"),
            Syntax::ThreeRegister => write!(out, " ${rd}, ${rs}, ${rt}"),
            Syntax::SourcePair => write!(out, " ${rs}, ${rt}"),
            Syntax::MoveFrom => write!(out, " ${rd}"),
            Syntax::Code => {
                let code = crate::isa::instruction::InstructionBits::code20(&self.code());
                if code == 0 {
                    Ok(())
                } else {
                    write!(out, " 0x{code:x}")
                }
            }
            Syntax::BranchZero => {
                write!(out, " ${rs}, {}", branch_target(pc, self.immediate()))
            }
            Syntax::BranchCompare => {
                write!(out, " ${rs}, ${rt}, {}", branch_target(pc, self.immediate()))
            }
            Syntax::Jump => write!(out, " {}", jump_target(pc, self.target())),
            Syntax::Immediate if op.zero_extends_immediate() => {
                write!(out, " ${rt}, ${rs}, 0x{:x}", self.immediate())
            }
            Syntax::Immediate => {
                write!(out, " ${rt}, ${rs}, {}", self.immediate() as i32)
            }
            Syntax::UpperImmediate => write!(out, " ${rt}, 0x{:x}", self.immediate()),
            Syntax::Memory => write!(out, " ${rt}, {}(${rs})", self.immediate() as i32),
            Syntax::Coprocessor if self.sel() == 0 => write!(out, " ${rt}, ${rd}"),
            Syntax::Coprocessor => write!(out, " ${rt}, ${rd}, {}", self.sel()),
            Syntax::Bare => Ok(()),
        };
        out
    }

    /// Returns `true` for opcodes that write `$31` or `rd` with a return address.
    pub const fn is_link(&self) -> bool {
        matches!(
            self.opcode(),
            Opcode::Jal | Opcode::Jalr | Opcode::Bltzal | Opcode::Bgezal
        )
    }
}

/// Disassembles a raw word at `pc`.
///
/// Unsupported encodings render as a `.word` directive.
pub fn disassemble(code: u32, pc: Address) -> String {
    decode(code).map_or_else(|_| format!(".word 0x{code:08x}"), |insn| insn.to_asm(pc))
}
