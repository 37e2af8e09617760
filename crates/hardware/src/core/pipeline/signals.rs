//! Pipeline control signals and operation types.
//!
//! This module defines the signals that control instruction execution. It performs:
//! 1. **Operation Classification:** Maps each opcode onto an ALU operation.
//! 2. **Operand Selection:** Chooses between `rt` and the extended immediate for ALU input B.
//! 3. **Memory Control:** Records access width and signedness for loads and stores.
//! 4. **Control Flow:** Branch conditions, jumps and return-address linking.
//! 5. **Coprocessor 0:** Register moves and the exception return.

use serde::Serialize;

use crate::common::constants::RA_REGISTER;
use crate::common::data::AccessControl;
use crate::isa::instruction::{Instruction, Opcode};

/// ALU operation types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum AluOp {
    /// Addition without overflow trap (default, also used for address generation).
    #[default]
    Addu,
    /// Addition trapping on signed overflow.
    Add,
    /// Subtraction trapping on signed overflow.
    Sub,
    /// Subtraction without overflow trap.
    Subu,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NOR.
    Nor,
    /// Set less than (signed).
    Slt,
    /// Set less than unsigned.
    Sltu,
    /// Shift left logical by `shamt`.
    Sll,
    /// Shift right logical by `shamt`.
    Srl,
    /// Shift right arithmetic by `shamt`.
    Sra,
    /// Shift left logical by `rs`.
    Sllv,
    /// Shift right logical by `rs`.
    Srlv,
    /// Shift right arithmetic by `rs`.
    Srav,
    /// Load upper immediate.
    Lui,
    /// Signed multiply into HI/LO.
    Mult,
    /// Unsigned multiply into HI/LO.
    Multu,
    /// Signed divide into HI/LO.
    Div,
    /// Unsigned divide into HI/LO.
    Divu,
    /// Read HI.
    Mfhi,
    /// Read LO.
    Mflo,
    /// Write HI.
    Mthi,
    /// Write LO.
    Mtlo,
    /// Move if `rt` is zero.
    Movz,
    /// Move if `rt` is not zero.
    Movn,
    /// Operation decoded but not implemented (trap compares).
    Unsupported,
}

/// Source for ALU operand B.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum OpBSrc {
    /// Use `rt` register value.
    #[default]
    Reg2,
    /// Use the extended immediate.
    Imm,
}

/// Branch condition evaluated on the `rs`/`rt` operands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum BranchCond {
    /// Not a conditional branch.
    #[default]
    None,
    /// `rs == rt`.
    Eq,
    /// `rs != rt`.
    Ne,
    /// `rs <= 0`.
    Lez,
    /// `rs > 0`.
    Gtz,
    /// `rs < 0`.
    Ltz,
    /// `rs >= 0`.
    Gez,
}

impl BranchCond {
    /// Evaluates the condition.
    pub const fn taken(self, rs: u32, rt: u32) -> bool {
        let s = rs as i32;
        match self {
            Self::None => false,
            Self::Eq => rs == rt,
            Self::Ne => rs != rt,
            Self::Lez => s <= 0,
            Self::Gtz => s > 0,
            Self::Ltz => s < 0,
            Self::Gez => s >= 0,
        }
    }
}

/// Control signals for pipeline stage execution.
///
/// Generated once in decode and carried by every later latch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ControlSignals {
    /// Enable write to the destination register.
    pub reg_write: bool,
    /// Destination register index.
    pub dest: u8,
    /// Enable memory read operation (load).
    pub mem_read: bool,
    /// Enable memory write operation (store).
    pub mem_write: bool,
    /// Width and signedness of the memory access.
    pub mem_ctl: AccessControl,
    /// ALU operation to perform.
    pub alu: AluOp,
    /// Source selection for ALU operand B.
    pub b_src: OpBSrc,
    /// Conditional branch test.
    pub branch: BranchCond,
    /// `J`/`JAL`.
    pub jump: bool,
    /// `JR`/`JALR`.
    pub jump_reg: bool,
    /// Writes a return address instead of the ALU result.
    pub link: bool,
    /// Reads `rs`.
    pub reads_rs: bool,
    /// Reads `rt`.
    pub reads_rt: bool,
    /// Reads HI.
    pub reads_hi: bool,
    /// Reads LO.
    pub reads_lo: bool,
    /// Writes HI.
    pub writes_hi: bool,
    /// Writes LO.
    pub writes_lo: bool,
    /// `SYSCALL`.
    pub syscall: bool,
    /// `BREAK`.
    pub brk: bool,
    /// `MFC0`: the result is a coprocessor 0 register.
    pub cop0_read: bool,
    /// `MTC0`: `rt` is written to a coprocessor 0 register at commit.
    pub cop0_write: bool,
    /// `ERET`.
    pub eret: bool,
}

impl ControlSignals {
    /// Derives the control signals for a decoded instruction.
    pub const fn from_instruction(insn: &Instruction) -> Self {
        let mut c = Self {
            reg_write: false,
            dest: 0,
            mem_read: false,
            mem_write: false,
            mem_ctl: AccessControl::None,
            alu: AluOp::Addu,
            b_src: OpBSrc::Reg2,
            branch: BranchCond::None,
            jump: false,
            jump_reg: false,
            link: false,
            reads_rs: false,
            reads_rt: false,
            reads_hi: false,
            reads_lo: false,
            writes_hi: false,
            writes_lo: false,
            syscall: false,
            brk: false,
            cop0_read: false,
            cop0_write: false,
            eret: false,
        };
        let code = insn.code();
        let rd = ((code >> 11) & 0x1F) as u8;
        let rt = ((code >> 16) & 0x1F) as u8;

        match insn.opcode() {
            op @ (Opcode::Sll | Opcode::Srl | Opcode::Sra) => {
                c.alu = match op {
                    Opcode::Sll => AluOp::Sll,
                    Opcode::Srl => AluOp::Srl,
                    _ => AluOp::Sra,
                };
                c.reads_rt = true;
                c.reg_write = true;
                c.dest = rd;
            }
            op @ (Opcode::Sllv | Opcode::Srlv | Opcode::Srav) => {
                c.alu = match op {
                    Opcode::Sllv => AluOp::Sllv,
                    Opcode::Srlv => AluOp::Srlv,
                    _ => AluOp::Srav,
                };
                c.reads_rs = true;
                c.reads_rt = true;
                c.reg_write = true;
                c.dest = rd;
            }
            Opcode::Jr => {
                c.jump_reg = true;
                c.reads_rs = true;
            }
            Opcode::Jalr => {
                c.jump_reg = true;
                c.reads_rs = true;
                c.link = true;
                c.reg_write = true;
                c.dest = rd;
            }
            op @ (Opcode::Movz | Opcode::Movn) => {
                c.alu = if matches!(op, Opcode::Movz) {
                    AluOp::Movz
                } else {
                    AluOp::Movn
                };
                c.reads_rs = true;
                c.reads_rt = true;
                c.reg_write = true;
                c.dest = rd;
            }
            Opcode::Syscall => c.syscall = true,
            Opcode::Break => c.brk = true,
            Opcode::Mfhi => {
                c.alu = AluOp::Mfhi;
                c.reads_hi = true;
                c.reg_write = true;
                c.dest = rd;
            }
            Opcode::Mflo => {
                c.alu = AluOp::Mflo;
                c.reads_lo = true;
                c.reg_write = true;
                c.dest = rd;
            }
            Opcode::Mthi => {
                c.alu = AluOp::Mthi;
                c.reads_rs = true;
                c.writes_hi = true;
            }
            Opcode::Mtlo => {
                c.alu = AluOp::Mtlo;
                c.reads_rs = true;
                c.writes_lo = true;
            }
            op @ (Opcode::Mult | Opcode::Multu | Opcode::Div | Opcode::Divu) => {
                c.alu = match op {
                    Opcode::Mult => AluOp::Mult,
                    Opcode::Multu => AluOp::Multu,
                    Opcode::Div => AluOp::Div,
                    _ => AluOp::Divu,
                };
                c.reads_rs = true;
                c.reads_rt = true;
                c.writes_hi = true;
                c.writes_lo = true;
            }
            op @ (Opcode::Add
            | Opcode::Addu
            | Opcode::Sub
            | Opcode::Subu
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Nor
            | Opcode::Slt
            | Opcode::Sltu) => {
                c.alu = match op {
                    Opcode::Add => AluOp::Add,
                    Opcode::Addu => AluOp::Addu,
                    Opcode::Sub => AluOp::Sub,
                    Opcode::Subu => AluOp::Subu,
                    Opcode::And => AluOp::And,
                    Opcode::Or => AluOp::Or,
                    Opcode::Xor => AluOp::Xor,
                    Opcode::Nor => AluOp::Nor,
                    Opcode::Slt => AluOp::Slt,
                    _ => AluOp::Sltu,
                };
                c.reads_rs = true;
                c.reads_rt = true;
                c.reg_write = true;
                c.dest = rd;
            }
            Opcode::Tge
            | Opcode::Tgeu
            | Opcode::Tlt
            | Opcode::Tltu
            | Opcode::Teq
            | Opcode::Tne => {
                c.alu = AluOp::Unsupported;
                c.reads_rs = true;
                c.reads_rt = true;
            }
            op @ (Opcode::Bltz | Opcode::Bgez | Opcode::Bltzal | Opcode::Bgezal) => {
                c.branch = match op {
                    Opcode::Bltz | Opcode::Bltzal => BranchCond::Ltz,
                    _ => BranchCond::Gez,
                };
                c.reads_rs = true;
                if matches!(op, Opcode::Bltzal | Opcode::Bgezal) {
                    c.link = true;
                    c.reg_write = true;
                    c.dest = RA_REGISTER;
                }
            }
            Opcode::J => c.jump = true,
            Opcode::Jal => {
                c.jump = true;
                c.link = true;
                c.reg_write = true;
                c.dest = RA_REGISTER;
            }
            op @ (Opcode::Beq | Opcode::Bne) => {
                c.branch = if matches!(op, Opcode::Beq) {
                    BranchCond::Eq
                } else {
                    BranchCond::Ne
                };
                c.reads_rs = true;
                c.reads_rt = true;
            }
            op @ (Opcode::Blez | Opcode::Bgtz) => {
                c.branch = if matches!(op, Opcode::Blez) {
                    BranchCond::Lez
                } else {
                    BranchCond::Gtz
                };
                c.reads_rs = true;
            }
            op @ (Opcode::Addi
            | Opcode::Addiu
            | Opcode::Slti
            | Opcode::Sltiu
            | Opcode::Andi
            | Opcode::Ori
            | Opcode::Xori) => {
                c.alu = match op {
                    Opcode::Addi => AluOp::Add,
                    Opcode::Addiu => AluOp::Addu,
                    Opcode::Slti => AluOp::Slt,
                    Opcode::Sltiu => AluOp::Sltu,
                    Opcode::Andi => AluOp::And,
                    Opcode::Ori => AluOp::Or,
                    _ => AluOp::Xor,
                };
                c.b_src = OpBSrc::Imm;
                c.reads_rs = true;
                c.reg_write = true;
                c.dest = rt;
            }
            Opcode::Lui => {
                c.alu = AluOp::Lui;
                c.b_src = OpBSrc::Imm;
                c.reg_write = true;
                c.dest = rt;
            }
            op @ (Opcode::Lb
            | Opcode::Lh
            | Opcode::Lwl
            | Opcode::Lw
            | Opcode::Lbu
            | Opcode::Lhu
            | Opcode::Lwr) => {
                c.mem_ctl = match op {
                    Opcode::Lb => AccessControl::Byte,
                    Opcode::Lh => AccessControl::Half,
                    Opcode::Lwl => AccessControl::WordLeft,
                    Opcode::Lw => AccessControl::Word,
                    Opcode::Lbu => AccessControl::ByteUnsigned,
                    Opcode::Lhu => AccessControl::HalfUnsigned,
                    _ => AccessControl::WordRight,
                };
                // LWL/LWR merge into the old destination value.
                c.reads_rt = matches!(op, Opcode::Lwl | Opcode::Lwr);
                c.b_src = OpBSrc::Imm;
                c.reads_rs = true;
                c.mem_read = true;
                c.reg_write = true;
                c.dest = rt;
            }
            op @ (Opcode::Sb | Opcode::Sh | Opcode::Swl | Opcode::Sw | Opcode::Swr) => {
                c.mem_ctl = match op {
                    Opcode::Sb => AccessControl::Byte,
                    Opcode::Sh => AccessControl::Half,
                    Opcode::Swl => AccessControl::WordLeft,
                    Opcode::Sw => AccessControl::Word,
                    _ => AccessControl::WordRight,
                };
                c.b_src = OpBSrc::Imm;
                c.reads_rs = true;
                c.reads_rt = true;
                c.mem_write = true;
            }
            Opcode::Mfc0 => {
                c.cop0_read = true;
                c.reg_write = true;
                c.dest = rt;
            }
            Opcode::Mtc0 => {
                c.cop0_write = true;
                c.reads_rt = true;
            }
            Opcode::Eret => c.eret = true,
        }
        if c.dest == 0 {
            c.reg_write = false;
        }
        c
    }

    /// Returns `true` when the instruction redirects control flow unconditionally.
    pub const fn is_jump(&self) -> bool {
        self.jump || self.jump_reg
    }

    /// Returns `true` for any control-transfer instruction.
    pub const fn is_control(&self) -> bool {
        self.is_jump() || !matches!(self.branch, BranchCond::None)
    }
}
