//! MIPS32 primary opcodes, SPECIAL function codes, REGIMM and COP0 selectors.
//!
//! Defines the raw field values the decoder dispatches on and the encoder emits.

/// Primary opcode values (bits 31-26).
pub mod primary {
    /// Register-register operations selected by the function field.
    pub const SPECIAL: u32 = 0x00;
    /// Branches on sign of `rs`, selected by the `rt` field.
    pub const REGIMM: u32 = 0x01;
    /// Jump.
    pub const J: u32 = 0x02;
    /// Jump and link.
    pub const JAL: u32 = 0x03;
    /// Branch on equal.
    pub const BEQ: u32 = 0x04;
    /// Branch on not equal.
    pub const BNE: u32 = 0x05;
    /// Branch on less than or equal to zero.
    pub const BLEZ: u32 = 0x06;
    /// Branch on greater than zero.
    pub const BGTZ: u32 = 0x07;
    /// Add immediate (trapping on overflow).
    pub const ADDI: u32 = 0x08;
    /// Add immediate unsigned.
    pub const ADDIU: u32 = 0x09;
    /// Set on less than immediate.
    pub const SLTI: u32 = 0x0a;
    /// Set on less than immediate unsigned.
    pub const SLTIU: u32 = 0x0b;
    /// And immediate.
    pub const ANDI: u32 = 0x0c;
    /// Or immediate.
    pub const ORI: u32 = 0x0d;
    /// Xor immediate.
    pub const XORI: u32 = 0x0e;
    /// Load upper immediate.
    pub const LUI: u32 = 0x0f;
    /// Coprocessor 0 operations selected by the `rs` field.
    pub const COP0: u32 = 0x10;
    /// Load byte.
    pub const LB: u32 = 0x20;
    /// Load half-word.
    pub const LH: u32 = 0x21;
    /// Load word left.
    pub const LWL: u32 = 0x22;
    /// Load word.
    pub const LW: u32 = 0x23;
    /// Load byte unsigned.
    pub const LBU: u32 = 0x24;
    /// Load half-word unsigned.
    pub const LHU: u32 = 0x25;
    /// Load word right.
    pub const LWR: u32 = 0x26;
    /// Store byte.
    pub const SB: u32 = 0x28;
    /// Store half-word.
    pub const SH: u32 = 0x29;
    /// Store word left.
    pub const SWL: u32 = 0x2a;
    /// Store word.
    pub const SW: u32 = 0x2b;
    /// Store word right.
    pub const SWR: u32 = 0x2e;
}

/// SPECIAL function codes (bits 5-0).
pub mod funct {
    /// Shift left logical.
    pub const SLL: u32 = 0x00;
    /// Shift right logical.
    pub const SRL: u32 = 0x02;
    /// Shift right arithmetic.
    pub const SRA: u32 = 0x03;
    /// Shift left logical variable.
    pub const SLLV: u32 = 0x04;
    /// Shift right logical variable.
    pub const SRLV: u32 = 0x06;
    /// Shift right arithmetic variable.
    pub const SRAV: u32 = 0x07;
    /// Jump register.
    pub const JR: u32 = 0x08;
    /// Jump and link register.
    pub const JALR: u32 = 0x09;
    /// Move conditional on zero.
    pub const MOVZ: u32 = 0x0a;
    /// Move conditional on not zero.
    pub const MOVN: u32 = 0x0b;
    /// System call.
    pub const SYSCALL: u32 = 0x0c;
    /// Breakpoint.
    pub const BREAK: u32 = 0x0d;
    /// Move from HI.
    pub const MFHI: u32 = 0x10;
    /// Move to HI.
    pub const MTHI: u32 = 0x11;
    /// Move from LO.
    pub const MFLO: u32 = 0x12;
    /// Move to LO.
    pub const MTLO: u32 = 0x13;
    /// Multiply.
    pub const MULT: u32 = 0x18;
    /// Multiply unsigned.
    pub const MULTU: u32 = 0x19;
    /// Divide.
    pub const DIV: u32 = 0x1a;
    /// Divide unsigned.
    pub const DIVU: u32 = 0x1b;
    /// Add (trapping on overflow).
    pub const ADD: u32 = 0x20;
    /// Add unsigned.
    pub const ADDU: u32 = 0x21;
    /// Subtract (trapping on overflow).
    pub const SUB: u32 = 0x22;
    /// Subtract unsigned.
    pub const SUBU: u32 = 0x23;
    /// Bitwise and.
    pub const AND: u32 = 0x24;
    /// Bitwise or.
    pub const OR: u32 = 0x25;
    /// Bitwise xor.
    pub const XOR: u32 = 0x26;
    /// Bitwise nor.
    pub const NOR: u32 = 0x27;
    /// Set on less than.
    pub const SLT: u32 = 0x2a;
    /// Set on less than unsigned.
    pub const SLTU: u32 = 0x2b;
    /// Trap if greater or equal.
    pub const TGE: u32 = 0x30;
    /// Trap if greater or equal unsigned.
    pub const TGEU: u32 = 0x31;
    /// Trap if less than.
    pub const TLT: u32 = 0x32;
    /// Trap if less than unsigned.
    pub const TLTU: u32 = 0x33;
    /// Trap if equal.
    pub const TEQ: u32 = 0x34;
    /// Trap if not equal.
    pub const TNE: u32 = 0x36;
}

/// REGIMM `rt` selectors (bits 20-16).
pub mod regimm {
    /// Branch on less than zero.
    pub const BLTZ: u32 = 0x00;
    /// Branch on greater than or equal to zero.
    pub const BGEZ: u32 = 0x01;
    /// Branch on less than zero and link.
    pub const BLTZAL: u32 = 0x10;
    /// Branch on greater than or equal to zero and link.
    pub const BGEZAL: u32 = 0x11;
}

/// COP0 `rs` selectors (bits 25-21) and the CO function codes.
pub mod cop0 {
    /// Move from coprocessor 0.
    pub const MF: u32 = 0x00;
    /// Move to coprocessor 0.
    pub const MT: u32 = 0x04;
    /// Coprocessor operation; the function field selects it.
    pub const CO: u32 = 0x10;
    /// Exception return (function code under CO).
    pub const ERET: u32 = 0x18;
}
