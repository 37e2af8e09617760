//! ALU shift operations.
//!
//! Implements shift-left logical, shift-right logical and shift-right arithmetic,
//! each with a constant (`shamt`) and a register-specified (`rs`) amount.
//! Register amounts use the low five bits only.

use crate::core::pipeline::signals::AluOp;

/// Bit mask for the shift amount (5 bits: 0-31).
const SHAMT_MASK: u32 = 0x1f;

/// Executes a shift operation on `b` (the `rt` value).
///
/// # Arguments
///
/// * `op` - The ALU operation (must be a shift variant).
/// * `a`  - The `rs` value, used as the amount by the variable forms.
/// * `b`  - The value to be shifted.
/// * `sa` - The constant amount for the immediate forms.
///
/// # Returns
///
/// The shifted value. Returns `0` for non-shift opcodes.
pub const fn execute(op: AluOp, a: u32, b: u32, sa: u8) -> u32 {
    let constant = sa as u32 & SHAMT_MASK;
    let variable = a & SHAMT_MASK;
    match op {
        AluOp::Sll => b << constant,
        AluOp::Srl => b >> constant,
        AluOp::Sra => ((b as i32) >> constant) as u32,
        AluOp::Sllv => b << variable,
        AluOp::Srlv => b >> variable,
        AluOp::Srav => ((b as i32) >> variable) as u32,
        _ => 0,
    }
}
