//! Instruction representation and field extraction.
//!
//! Provides bit extraction for the MIPS32 instruction formats and the decoded
//! `Instruction` value produced by [`decode`](crate::isa::decode::decode). It provides:
//! 1. **Field Access:** The `InstructionBits` trait over raw `u32` words.
//! 2. **Operations:** The closed `Opcode` set with mnemonic, format and kind metadata.
//! 3. **Decoded Values:** `Instruction`, an immutable pairing of raw code and operation.

use serde::{Deserialize, Serialize};

/// Bit mask for 5-bit register and shift-amount fields.
pub const REG_MASK: u32 = 0x1F;
/// Bit mask for the 6-bit primary opcode and function fields.
pub const OP_MASK: u32 = 0x3F;
/// Bit mask for the 16-bit immediate field.
pub const IMM_MASK: u32 = 0xFFFF;
/// Bit mask for the 26-bit jump target field.
pub const TARGET_MASK: u32 = 0x03FF_FFFF;
/// Bit mask for the 3-bit coprocessor register select field.
pub const SEL_MASK: u32 = 0x7;

/// Bit position of the primary opcode.
pub const OPCODE_SHIFT: u32 = 26;
/// Bit position of `rs`.
pub const RS_SHIFT: u32 = 21;
/// Bit position of `rt`.
pub const RT_SHIFT: u32 = 16;
/// Bit position of `rd`.
pub const RD_SHIFT: u32 = 11;
/// Bit position of the shift amount.
pub const SHAMT_SHIFT: u32 = 6;

/// Trait for extracting instruction fields from encoded instructions.
pub trait InstructionBits {
    /// Primary opcode (bits 31-26).
    fn opcode(&self) -> u32;
    /// First source register (bits 25-21).
    fn rs(&self) -> u8;
    /// Second source / immediate destination register (bits 20-16).
    fn rt(&self) -> u8;
    /// R-type destination register (bits 15-11).
    fn rd(&self) -> u8;
    /// Shift amount (bits 10-6).
    fn shamt(&self) -> u8;
    /// Function code (bits 5-0).
    fn funct(&self) -> u32;
    /// Raw 16-bit immediate (bits 15-0).
    fn imm16(&self) -> u16;
    /// Raw 26-bit jump target (bits 25-0).
    fn target26(&self) -> u32;
    /// Code field of SYSCALL/BREAK (bits 25-6).
    fn code20(&self) -> u32;
    /// Coprocessor register select (bits 2-0).
    fn sel(&self) -> u8;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        (self >> OPCODE_SHIFT) & OP_MASK
    }

    #[inline(always)]
    fn rs(&self) -> u8 {
        ((self >> RS_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rt(&self) -> u8 {
        ((self >> RT_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rd(&self) -> u8 {
        ((self >> RD_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn shamt(&self) -> u8 {
        ((self >> SHAMT_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn funct(&self) -> u32 {
        self & OP_MASK
    }

    #[inline(always)]
    fn imm16(&self) -> u16 {
        (self & IMM_MASK) as u16
    }

    #[inline(always)]
    fn target26(&self) -> u32 {
        self & TARGET_MASK
    }

    #[inline(always)]
    fn code20(&self) -> u32 {
        (self >> SHAMT_SHIFT) & 0xF_FFFF
    }

    #[inline(always)]
    fn sel(&self) -> u8 {
        (self & SEL_MASK) as u8
    }
}

/// Encoding format family.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Register-register (`rs`, `rt`, `rd`, `shamt`, `funct`).
    R,
    /// Register-immediate (`rs`, `rt`, 16-bit immediate).
    I,
    /// Jump (26-bit target).
    J,
}

/// Operation class used for statistics and control-signal derivation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Register-register arithmetic, logic, HI/LO and multiply/divide.
    Arithmetic,
    /// Register-immediate arithmetic and logic.
    ArithmeticImmediate,
    /// Memory load.
    Load,
    /// Memory store.
    Store,
    /// Constant or variable shift.
    Shift,
    /// Unconditional jump.
    Jump,
    /// Conditional branch.
    Branch,
    /// SYSCALL / BREAK / ERET.
    System,
}

/// Operand layout shared by the disassembler, the encoder and the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Syntax {
    /// `op $rd, $rt, sa`
    ShiftImmediate,
    /// `op $rd, $rt, $rs`
    ShiftVariable,
    /// `op $rs`
    JumpRegister,
    /// `op $rd, $rs`
    JumpRegisterLink,
    /// `op $rd, $rs, $rt`
    ThreeRegister,
    /// `op $rs, $rt`
    SourcePair,
    /// `op $rd`
    MoveFrom,
    /// `op $rs`
    MoveTo,
    /// `op [code]`
    Code,
    /// `op $rs, target`
    BranchZero,
    /// `op $rs, $rt, target`
    BranchCompare,
    /// `op target`
    Jump,
    /// `op $rt, $rs, imm`
    Immediate,
    /// `op $rt, imm`
    UpperImmediate,
    /// `op $rt, offset($rs)`
    Memory,
    /// `op $rt, $rd[, sel]` with `rd` naming a coprocessor register
    Coprocessor,
    /// `op`
    Bare,
}

/// Every operation the decoder recognizes.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    #[default]
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Jr,
    Jalr,
    Movz,
    Movn,
    Syscall,
    Break,
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Mult,
    Multu,
    Div,
    Divu,
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Tge,
    Tgeu,
    Tlt,
    Tltu,
    Teq,
    Tne,
    Bltz,
    Bgez,
    Bltzal,
    Bgezal,
    J,
    Jal,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    Lb,
    Lh,
    Lwl,
    Lw,
    Lbu,
    Lhu,
    Lwr,
    Sb,
    Sh,
    Swl,
    Sw,
    Swr,
    Mfc0,
    Mtc0,
    Eret,
}

impl Opcode {
    /// Every opcode, in declaration order.
    pub const ALL: [Self; 69] = [
        Self::Sll,
        Self::Srl,
        Self::Sra,
        Self::Sllv,
        Self::Srlv,
        Self::Srav,
        Self::Jr,
        Self::Jalr,
        Self::Movz,
        Self::Movn,
        Self::Syscall,
        Self::Break,
        Self::Mfhi,
        Self::Mthi,
        Self::Mflo,
        Self::Mtlo,
        Self::Mult,
        Self::Multu,
        Self::Div,
        Self::Divu,
        Self::Add,
        Self::Addu,
        Self::Sub,
        Self::Subu,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Nor,
        Self::Slt,
        Self::Sltu,
        Self::Tge,
        Self::Tgeu,
        Self::Tlt,
        Self::Tltu,
        Self::Teq,
        Self::Tne,
        Self::Bltz,
        Self::Bgez,
        Self::Bltzal,
        Self::Bgezal,
        Self::J,
        Self::Jal,
        Self::Beq,
        Self::Bne,
        Self::Blez,
        Self::Bgtz,
        Self::Addi,
        Self::Addiu,
        Self::Slti,
        Self::Sltiu,
        Self::Andi,
        Self::Ori,
        Self::Xori,
        Self::Lui,
        Self::Lb,
        Self::Lh,
        Self::Lwl,
        Self::Lw,
        Self::Lbu,
        Self::Lhu,
        Self::Lwr,
        Self::Sb,
        Self::Sh,
        Self::Swl,
        Self::Sw,
        Self::Swr,
        Self::Mfc0,
        Self::Mtc0,
        Self::Eret,
    ];

    /// Assembler mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Sllv => "sllv",
            Self::Srlv => "srlv",
            Self::Srav => "srav",
            Self::Jr => "jr",
            Self::Jalr => "jalr",
            Self::Movz => "movz",
            Self::Movn => "movn",
            Self::Syscall => "syscall",
            Self::Break => "break",
            Self::Mfhi => "mfhi",
            Self::Mthi => "mthi",
            Self::Mflo => "mflo",
            Self::Mtlo => "mtlo",
            Self::Mult => "mult",
            Self::Multu => "multu",
            Self::Div => "div",
            Self::Divu => "divu",
            Self::Add => "add",
            Self::Addu => "addu",
            Self::Sub => "sub",
            Self::Subu => "subu",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Nor => "nor",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
            Self::Tge => "tge",
            Self::Tgeu => "tgeu",
            Self::Tlt => "tlt",
            Self::Tltu => "tltu",
            Self::Teq => "teq",
            Self::Tne => "tne",
            Self::Bltz => "bltz",
            Self::Bgez => "bgez",
            Self::Bltzal => "bltzal",
            Self::Bgezal => "bgezal",
            Self::J => "j",
            Self::Jal => "jal",
            Self::Beq => "beq",
            Self::Bne => "bne",
            Self::Blez => "blez",
            Self::Bgtz => "bgtz",
            Self::Addi => "addi",
            Self::Addiu => "addiu",
            Self::Slti => "slti",
            Self::Sltiu => "sltiu",
            Self::Andi => "andi",
            Self::Ori => "ori",
            Self::Xori => "xori",
            Self::Lui => "lui",
            Self::Lb => "lb",
            Self::Lh => "lh",
            Self::Lwl => "lwl",
            Self::Lw => "lw",
            Self::Lbu => "lbu",
            Self::Lhu => "lhu",
            Self::Lwr => "lwr",
            Self::Sb => "sb",
            Self::Sh => "sh",
            Self::Swl => "swl",
            Self::Sw => "sw",
            Self::Swr => "swr",
            Self::Mfc0 => "mfc0",
            Self::Mtc0 => "mtc0",
            Self::Eret => "eret",
        }
    }

    /// Looks up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        let lower = text.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|op| op.mnemonic() == lower)
    }

    /// Encoding format family.
    pub const fn format(self) -> Format {
        match self {
            Self::J | Self::Jal => Format::J,
            Self::Bltz
            | Self::Bgez
            | Self::Bltzal
            | Self::Bgezal
            | Self::Beq
            | Self::Bne
            | Self::Blez
            | Self::Bgtz
            | Self::Addi
            | Self::Addiu
            | Self::Slti
            | Self::Sltiu
            | Self::Andi
            | Self::Ori
            | Self::Xori
            | Self::Lui
            | Self::Lb
            | Self::Lh
            | Self::Lwl
            | Self::Lw
            | Self::Lbu
            | Self::Lhu
            | Self::Lwr
            | Self::Sb
            | Self::Sh
            | Self::Swl
            | Self::Sw
            | Self::Swr => Format::I,
            _ => Format::R,
        }
    }

    /// Operation class.
    pub const fn kind(self) -> OperationKind {
        match self {
            Self::Sll | Self::Srl | Self::Sra | Self::Sllv | Self::Srlv | Self::Srav => {
                OperationKind::Shift
            }
            Self::Jr | Self::Jalr | Self::J | Self::Jal => OperationKind::Jump,
            Self::Syscall | Self::Break | Self::Eret => OperationKind::System,
            Self::Bltz
            | Self::Bgez
            | Self::Bltzal
            | Self::Bgezal
            | Self::Beq
            | Self::Bne
            | Self::Blez
            | Self::Bgtz => OperationKind::Branch,
            Self::Addi
            | Self::Addiu
            | Self::Slti
            | Self::Sltiu
            | Self::Andi
            | Self::Ori
            | Self::Xori
            | Self::Lui => OperationKind::ArithmeticImmediate,
            Self::Lb | Self::Lh | Self::Lwl | Self::Lw | Self::Lbu | Self::Lhu | Self::Lwr => {
                OperationKind::Load
            }
            Self::Sb | Self::Sh | Self::Swl | Self::Sw | Self::Swr => OperationKind::Store,
            _ => OperationKind::Arithmetic,
        }
    }

    /// Operand layout of the assembly form.
    pub const fn syntax(self) -> Syntax {
        match self {
            Self::Sll | Self::Srl | Self::Sra => Syntax::ShiftImmediate,
            Self::Sllv | Self::Srlv | Self::Srav => Syntax::ShiftVariable,
            Self::Jr => Syntax::JumpRegister,
            Self::Jalr => Syntax::JumpRegisterLink,
            Self::Syscall | Self::Break => Syntax::Code,
            Self::Mfhi | Self::Mflo => Syntax::MoveFrom,
            Self::Mthi | Self::Mtlo => Syntax::MoveTo,
            Self::Mult
            | Self::Multu
            | Self::Div
            | Self::Divu
            | Self::Tge
            | Self::Tgeu
            | Self::Tlt
            | Self::Tltu
            | Self::Teq
            | Self::Tne => Syntax::SourcePair,
            Self::Bltz | Self::Bgez | Self::Bltzal | Self::Bgezal | Self::Blez | Self::Bgtz => {
                Syntax::BranchZero
            }
            Self::Beq | Self::Bne => Syntax::BranchCompare,
            Self::J | Self::Jal => Syntax::Jump,
            Self::Addi
            | Self::Addiu
            | Self::Slti
            | Self::Sltiu
            | Self::Andi
            | Self::Ori
            | Self::Xori => Syntax::Immediate,
            Self::Lui => Syntax::UpperImmediate,
            Self::Lb
            | Self::Lh
            | Self::Lwl
            | Self::Lw
            | Self::Lbu
            | Self::Lhu
            | Self::Lwr
            | Self::Sb
            | Self::Sh
            | Self::Swl
            | Self::Sw
            | Self::Swr => Syntax::Memory,
            Self::Mfc0 | Self::Mtc0 => Syntax::Coprocessor,
            Self::Eret => Syntax::Bare,
            _ => Syntax::ThreeRegister,
        }
    }

    /// Returns `true` if the immediate is zero-extended rather than sign-extended.
    pub const fn zero_extends_immediate(self) -> bool {
        matches!(self, Self::Andi | Self::Ori | Self::Xori | Self::Lui)
    }
}

/// A decoded instruction.
///
/// Pairs the raw code with the operation it encodes; operand fields are read
/// from the code on demand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Instruction {
    code: u32,
    opcode: Opcode,
}

impl Instruction {
    /// The canonical no-op (`sll $0, $0, 0`).
    pub const NOP: Self = Self {
        code: 0,
        opcode: Opcode::Sll,
    };

    pub(crate) const fn from_parts(code: u32, opcode: Opcode) -> Self {
        Self { code, opcode }
    }

    /// Raw 32-bit code.
    #[inline(always)]
    pub const fn code(&self) -> u32 {
        self.code
    }

    /// Decoded operation.
    #[inline(always)]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Operation class.
    pub const fn kind(&self) -> OperationKind {
        self.opcode.kind()
    }

    /// Returns `true` for the all-zero no-op word.
    pub const fn is_nop(&self) -> bool {
        self.code == 0
    }

    /// First source register.
    pub fn rs(&self) -> u8 {
        self.code.rs()
    }

    /// Second source register (or I-type destination).
    pub fn rt(&self) -> u8 {
        self.code.rt()
    }

    /// R-type destination register.
    pub fn rd(&self) -> u8 {
        self.code.rd()
    }

    /// Shift amount.
    pub fn shamt(&self) -> u8 {
        self.code.shamt()
    }

    /// Immediate, zero- or sign-extended to 32 bits according to the opcode.
    pub fn immediate(&self) -> u32 {
        let raw = self.code.imm16();
        if self.opcode.zero_extends_immediate() {
            u32::from(raw)
        } else {
            raw as i16 as i32 as u32
        }
    }

    /// 26-bit jump target field.
    pub fn target(&self) -> u32 {
        self.code.target26()
    }

    /// Coprocessor register select.
    pub fn sel(&self) -> u8 {
        self.code.sel()
    }
}
