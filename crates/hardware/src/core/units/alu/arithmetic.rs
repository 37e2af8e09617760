//! ALU arithmetic operations.
//!
//! Implements 32-bit addition and subtraction (with and without the signed
//! overflow trap) and the HI/LO multiply/divide family.

use crate::common::error::ExceptionCause;
use crate::core::pipeline::signals::AluOp;

/// Number of bits in a word (used to split 64-bit products into HI/LO).
const WORD_BITS: u32 = 32;

/// Executes an addition or subtraction.
///
/// # Arguments
///
/// * `op` - One of `Add`, `Addu`, `Sub`, `Subu`.
/// * `a`  - First operand.
/// * `b`  - Second operand.
///
/// # Returns
///
/// The 32-bit result, or `Overflow` when a trapping variant overflows as a
/// signed operation.
pub fn add_sub(op: AluOp, a: u32, b: u32) -> Result<u32, ExceptionCause> {
    match op {
        AluOp::Add => (a as i32)
            .checked_add(b as i32)
            .map(|v| v as u32)
            .ok_or(ExceptionCause::Overflow),
        AluOp::Sub => (a as i32)
            .checked_sub(b as i32)
            .map(|v| v as u32)
            .ok_or(ExceptionCause::Overflow),
        AluOp::Subu => Ok(a.wrapping_sub(b)),
        _ => Ok(a.wrapping_add(b)),
    }
}

/// Executes a multiply or divide.
///
/// # Returns
///
/// The `(hi, lo)` pair. Multiplies return the upper and lower halves of the
/// 64-bit product; divides return the remainder in HI and the quotient in LO.
pub fn mul_div(op: AluOp, a: u32, b: u32) -> (u32, u32) {
    match op {
        AluOp::Mult => {
            let p = i64::from(a as i32) * i64::from(b as i32);
            ((p >> WORD_BITS) as u32, p as u32)
        }
        AluOp::Multu => {
            let p = u64::from(a) * u64::from(b);
            ((p >> WORD_BITS) as u32, p as u32)
        }
        AluOp::Div => {
            if b == 0 {
                (a, u32::MAX)
            } else {
                let (s, t) = (a as i32, b as i32);
                (s.wrapping_rem(t) as u32, s.wrapping_div(t) as u32)
            }
        }
        AluOp::Divu => {
            if b == 0 {
                (a, u32::MAX)
            } else {
                (a % b, a / b)
            }
        }
        _ => (0, 0),
    }
}
