//! ALU logical and comparison operations.
//!
//! Implements bitwise AND, OR, XOR and NOR, signed and unsigned set-less-than,
//! and the load-upper-immediate shift.

use crate::core::pipeline::signals::AluOp;

/// Executes a logical or comparison operation.
///
/// # Arguments
///
/// * `op` - The ALU operation (must be a logic or comparison variant).
/// * `a`  - First operand.
/// * `b`  - Second operand.
///
/// # Returns
///
/// The 32-bit result. Comparisons return `1` or `0`; non-logic opcodes return `0`.
pub const fn execute(op: AluOp, a: u32, b: u32) -> u32 {
    match op {
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Nor => !(a | b),
        AluOp::Slt => ((a as i32) < (b as i32)) as u32,
        AluOp::Sltu => (a < b) as u32,
        AluOp::Lui => b << 16,
        _ => 0,
    }
}
