//! MIPS32 instruction decoder.
//!
//! This module maps a 32-bit instruction word to an [`Instruction`]. Decoding extracts the
//! primary opcode and dispatches to the R-type (SPECIAL function code), REGIMM (`rt`
//! selector), COP0 (`rs` selector), J-type or I-type tables. Unknown combinations yield
//! [`DecodeError::UnsupportedInstruction`] carrying the raw word.

use crate::common::error::DecodeError;
use crate::isa::instruction::{Instruction, InstructionBits, Opcode};
use crate::isa::opcodes::{cop0, funct, primary, regimm};

/// Decodes a 32-bit instruction word.
///
/// # Arguments
///
/// * `code` - The raw instruction word.
///
/// # Returns
///
/// The decoded instruction, or `DecodeError::UnsupportedInstruction` for reserved
/// or unimplemented encodings.
pub fn decode(code: u32) -> Result<Instruction, DecodeError> {
    let opcode = match code.opcode() {
        primary::SPECIAL => decode_special(code.funct()),
        primary::REGIMM => decode_regimm(u32::from(code.rt())),
        primary::COP0 => decode_cop0(code),
        other => decode_primary(other),
    };
    opcode
        .map(|op| Instruction::from_parts(code, op))
        .ok_or(DecodeError::UnsupportedInstruction { code })
}

/// Decodes a word, substituting a no-op for unsupported encodings.
///
/// Used by trace and disassembly views that must render arbitrary memory.
pub fn decode_or_nop(code: u32) -> Instruction {
    decode(code).unwrap_or(Instruction::NOP)
}

const fn decode_special(function: u32) -> Option<Opcode> {
    Some(match function {
        funct::SLL => Opcode::Sll,
        funct::SRL => Opcode::Srl,
        funct::SRA => Opcode::Sra,
        funct::SLLV => Opcode::Sllv,
        funct::SRLV => Opcode::Srlv,
        funct::SRAV => Opcode::Srav,
        funct::JR => Opcode::Jr,
        funct::JALR => Opcode::Jalr,
        funct::MOVZ => Opcode::Movz,
        funct::MOVN => Opcode::Movn,
        funct::SYSCALL => Opcode::Syscall,
        funct::BREAK => Opcode::Break,
        funct::MFHI => Opcode::Mfhi,
        funct::MTHI => Opcode::Mthi,
        funct::MFLO => Opcode::Mflo,
        funct::MTLO => Opcode::Mtlo,
        funct::MULT => Opcode::Mult,
        funct::MULTU => Opcode::Multu,
        funct::DIV => Opcode::Div,
        funct::DIVU => Opcode::Divu,
        funct::ADD => Opcode::Add,
        funct::ADDU => Opcode::Addu,
        funct::SUB => Opcode::Sub,
        funct::SUBU => Opcode::Subu,
        funct::AND => Opcode::And,
        funct::OR => Opcode::Or,
        funct::XOR => Opcode::Xor,
        funct::NOR => Opcode::Nor,
        funct::SLT => Opcode::Slt,
        funct::SLTU => Opcode::Sltu,
        funct::TGE => Opcode::Tge,
        funct::TGEU => Opcode::Tgeu,
        funct::TLT => Opcode::Tlt,
        funct::TLTU => Opcode::Tltu,
        funct::TEQ => Opcode::Teq,
        funct::TNE => Opcode::Tne,
        _ => return None,
    })
}

const fn decode_regimm(rt: u32) -> Option<Opcode> {
    Some(match rt {
        regimm::BLTZ => Opcode::Bltz,
        regimm::BGEZ => Opcode::Bgez,
        regimm::BLTZAL => Opcode::Bltzal,
        regimm::BGEZAL => Opcode::Bgezal,
        _ => return None,
    })
}

/// Moves require bits 10-3 clear; ERET is a single fixed word.
fn decode_cop0(code: u32) -> Option<Opcode> {
    const ERET_WORD: u32 = (primary::COP0 << 26) | (cop0::CO << 21) | cop0::ERET;
    match u32::from(code.rs()) {
        cop0::MF if code & 0x7f8 == 0 => Some(Opcode::Mfc0),
        cop0::MT if code & 0x7f8 == 0 => Some(Opcode::Mtc0),
        cop0::CO if code == ERET_WORD => Some(Opcode::Eret),
        _ => None,
    }
}

const fn decode_primary(op: u32) -> Option<Opcode> {
    Some(match op {
        primary::J => Opcode::J,
        primary::JAL => Opcode::Jal,
        primary::BEQ => Opcode::Beq,
        primary::BNE => Opcode::Bne,
        primary::BLEZ => Opcode::Blez,
        primary::BGTZ => Opcode::Bgtz,
        primary::ADDI => Opcode::Addi,
        primary::ADDIU => Opcode::Addiu,
        primary::SLTI => Opcode::Slti,
        primary::SLTIU => Opcode::Sltiu,
        primary::ANDI => Opcode::Andi,
        primary::ORI => Opcode::Ori,
        primary::XORI => Opcode::Xori,
        primary::LUI => Opcode::Lui,
        primary::LB => Opcode::Lb,
        primary::LH => Opcode::Lh,
        primary::LWL => Opcode::Lwl,
        primary::LW => Opcode::Lw,
        primary::LBU => Opcode::Lbu,
        primary::LHU => Opcode::Lhu,
        primary::LWR => Opcode::Lwr,
        primary::SB => Opcode::Sb,
        primary::SH => Opcode::Sh,
        primary::SWL => Opcode::Swl,
        primary::SW => Opcode::Sw,
        primary::SWR => Opcode::Swr,
        _ => return None,
    })
}
