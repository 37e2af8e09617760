//! Instruction encoder.
//!
//! Builds instruction words from an opcode and operand fields. Only the fields the
//! opcode's [`Syntax`] uses are placed; the rest of the word is zero, so decoding an
//! encoded word always yields the same opcode and operand fields.

use crate::isa::instruction::{
    IMM_MASK, OPCODE_SHIFT, Opcode, RD_SHIFT, REG_MASK, RS_SHIFT, RT_SHIFT, SEL_MASK, SHAMT_SHIFT,
    Syntax, TARGET_MASK,
};
use crate::isa::opcodes::{cop0, funct, primary, regimm};

/// Operand fields of an instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fields {
    /// First source register.
    pub rs: u8,
    /// Second source / I-type destination register.
    pub rt: u8,
    /// R-type destination register.
    pub rd: u8,
    /// Shift amount.
    pub shamt: u8,
    /// Raw 16-bit immediate or branch offset (in words).
    pub imm: u16,
    /// 26-bit jump target (word index within the 256 MiB region).
    pub target: u32,
    /// SYSCALL/BREAK code.
    pub code: u32,
    /// Coprocessor register select.
    pub sel: u8,
}

impl Fields {
    /// Returns a copy with every field the syntax ignores cleared.
    pub fn masked(self, syntax: Syntax) -> Self {
        let mut out = Self::default();
        match syntax {
            Syntax::ShiftImmediate => {
                out.rd = self.rd;
                out.rt = self.rt;
                out.shamt = self.shamt;
            }
            Syntax::ShiftVariable | Syntax::ThreeRegister => {
                out.rd = self.rd;
                out.rt = self.rt;
                out.rs = self.rs;
            }
            Syntax::JumpRegister | Syntax::MoveTo => out.rs = self.rs,
            Syntax::JumpRegisterLink => {
                out.rd = self.rd;
                out.rs = self.rs;
            }
            Syntax::SourcePair => {
                out.rs = self.rs;
                out.rt = self.rt;
            }
            Syntax::MoveFrom => out.rd = self.rd,
            Syntax::Code => out.code = self.code,
            Syntax::BranchZero => {
                out.rs = self.rs;
                out.imm = self.imm;
            }
            Syntax::BranchCompare | Syntax::Immediate | Syntax::Memory => {
                out.rs = self.rs;
                out.rt = self.rt;
                out.imm = self.imm;
            }
            Syntax::Jump => out.target = self.target,
            Syntax::UpperImmediate => {
                out.rt = self.rt;
                out.imm = self.imm;
            }
            Syntax::Coprocessor => {
                out.rt = self.rt;
                out.rd = self.rd;
                out.sel = self.sel & SEL_MASK as u8;
            }
            Syntax::Bare => {}
        }
        out
    }
}

/// Encodes an instruction.
///
/// # Arguments
///
/// * `op` - The operation.
/// * `fields` - Operand fields; fields unused by `op` are ignored.
///
/// # Returns
///
/// The 32-bit instruction word.
pub fn encode(op: Opcode, fields: Fields) -> u32 {
    let f = fields.masked(op.syntax());
    let (major, minor) = selector(op);
    let mut word = major << OPCODE_SHIFT;

    word |= (u32::from(f.rs) & REG_MASK) << RS_SHIFT;
    if major == primary::REGIMM {
        word |= minor << RT_SHIFT;
    } else {
        word |= (u32::from(f.rt) & REG_MASK) << RT_SHIFT;
    }
    word |= (u32::from(f.rd) & REG_MASK) << RD_SHIFT;
    word |= (u32::from(f.shamt) & REG_MASK) << SHAMT_SHIFT;
    word |= u32::from(f.imm) & IMM_MASK;
    word |= f.target & TARGET_MASK;
    word |= (f.code & 0xF_FFFF) << SHAMT_SHIFT;
    word |= u32::from(f.sel) & SEL_MASK;
    match major {
        primary::SPECIAL => word |= minor,
        primary::COP0 => {
            word |= minor << RS_SHIFT;
            if minor == cop0::CO {
                word |= cop0::ERET;
            }
        }
        _ => {}
    }
    word
}

/// Returns the primary opcode and the function code, REGIMM selector or COP0 `rs`
/// selector for `op`.
const fn selector(op: Opcode) -> (u32, u32) {
    match op {
        Opcode::Sll => (primary::SPECIAL, funct::SLL),
        Opcode::Srl => (primary::SPECIAL, funct::SRL),
        Opcode::Sra => (primary::SPECIAL, funct::SRA),
        Opcode::Sllv => (primary::SPECIAL, funct::SLLV),
        Opcode::Srlv => (primary::SPECIAL, funct::SRLV),
        Opcode::Srav => (primary::SPECIAL, funct::SRAV),
        Opcode::Jr => (primary::SPECIAL, funct::JR),
        Opcode::Jalr => (primary::SPECIAL, funct::JALR),
        Opcode::Movz => (primary::SPECIAL, funct::MOVZ),
        Opcode::Movn => (primary::SPECIAL, funct::MOVN),
        Opcode::Syscall => (primary::SPECIAL, funct::SYSCALL),
        Opcode::Break => (primary::SPECIAL, funct::BREAK),
        Opcode::Mfhi => (primary::SPECIAL, funct::MFHI),
        Opcode::Mthi => (primary::SPECIAL, funct::MTHI),
        Opcode::Mflo => (primary::SPECIAL, funct::MFLO),
        Opcode::Mtlo => (primary::SPECIAL, funct::MTLO),
        Opcode::Mult => (primary::SPECIAL, funct::MULT),
        Opcode::Multu => (primary::SPECIAL, funct::MULTU),
        Opcode::Div => (primary::SPECIAL, funct::DIV),
        Opcode::Divu => (primary::SPECIAL, funct::DIVU),
        Opcode::Add => (primary::SPECIAL, funct::ADD),
        Opcode::Addu => (primary::SPECIAL, funct::ADDU),
        Opcode::Sub => (primary::SPECIAL, funct::SUB),
        Opcode::Subu => (primary::SPECIAL, funct::SUBU),
        Opcode::And => (primary::SPECIAL, funct::AND),
        Opcode::Or => (primary::SPECIAL, funct::OR),
        Opcode::Xor => (primary::SPECIAL, funct::XOR),
        Opcode::Nor => (primary::SPECIAL, funct::NOR),
        Opcode::Slt => (primary::SPECIAL, funct::SLT),
        Opcode::Sltu => (primary::SPECIAL, funct::SLTU),
        Opcode::Tge => (primary::SPECIAL, funct::TGE),
        Opcode::Tgeu => (primary::SPECIAL, funct::TGEU),
        Opcode::Tlt => (primary::SPECIAL, funct::TLT),
        Opcode::Tltu => (primary::SPECIAL, funct::TLTU),
        Opcode::Teq => (primary::SPECIAL, funct::TEQ),
        Opcode::Tne => (primary::SPECIAL, funct::TNE),
        Opcode::Bltz => (primary::REGIMM, regimm::BLTZ),
        Opcode::Bgez => (primary::REGIMM, regimm::BGEZ),
        Opcode::Bltzal => (primary::REGIMM, regimm::BLTZAL),
        Opcode::Bgezal => (primary::REGIMM, regimm::BGEZAL),
        Opcode::J => (primary::J, 0),
        Opcode::Jal => (primary::JAL, 0),
        Opcode::Beq => (primary::BEQ, 0),
        Opcode::Bne => (primary::BNE, 0),
        Opcode::Blez => (primary::BLEZ, 0),
        Opcode::Bgtz => (primary::BGTZ, 0),
        Opcode::Addi => (primary::ADDI, 0),
        Opcode::Addiu => (primary::ADDIU, 0),
        Opcode::Slti => (primary::SLTI, 0),
        Opcode::Sltiu => (primary::SLTIU, 0),
        Opcode::Andi => (primary::ANDI, 0),
        Opcode::Ori => (primary::ORI, 0),
        Opcode::Xori => (primary::XORI, 0),
        Opcode::Lui => (primary::LUI, 0),
        Opcode::Lb => (primary::LB, 0),
        Opcode::Lh => (primary::LH, 0),
        Opcode::Lwl => (primary::LWL, 0),
        Opcode::Lw => (primary::LW, 0),
        Opcode::Lbu => (primary::LBU, 0),
        Opcode::Lhu => (primary::LHU, 0),
        Opcode::Lwr => (primary::LWR, 0),
        Opcode::Sb => (primary::SB, 0),
        Opcode::Sh => (primary::SH, 0),
        Opcode::Swl => (primary::SWL, 0),
        Opcode::Sw => (primary::SW, 0),
        Opcode::Swr => (primary::SWR, 0),
        Opcode::Mfc0 => (primary::COP0, cop0::MF),
        Opcode::Mtc0 => (primary::COP0, cop0::MT),
        Opcode::Eret => (primary::COP0, cop0::CO),
    }
}

/// Reads the operand fields back out of an encoded word, masked to the opcode's syntax.
pub fn fields_of(op: Opcode, word: u32) -> Fields {
    use crate::isa::instruction::InstructionBits;
    Fields {
        rs: word.rs(),
        rt: word.rt(),
        rd: word.rd(),
        shamt: word.shamt(),
        imm: word.imm16(),
        target: word.target26(),
        code: word.code20(),
        sel: word.sel(),
    }
    .masked(op.syntax())
}
