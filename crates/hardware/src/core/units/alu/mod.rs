//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU used in the Execute stage.
//! It handles arithmetic, logical operations, shifts, HI/LO transfers and
//! the multiply/divide unit of the MIPS32 integer subset.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Addu, Sub, Subu, Mult, Multu, Div, Divu
//! - [`logic`]:      And, Or, Xor, Nor, Slt, Sltu, Lui
//! - [`shifts`]:     Sll, Srl, Sra and their variable forms

/// Integer arithmetic operations (add, subtract, multiply, divide).
pub mod arithmetic;

/// Bitwise logical and comparison operations.
pub mod logic;

/// Shift operations.
pub mod shifts;

use crate::common::data::RegisterValue;
use crate::common::error::ExceptionCause;
use crate::core::pipeline::signals::AluOp;

/// Result of one ALU operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AluOutput {
    /// Value destined for the general-purpose destination register.
    pub value: RegisterValue,
    /// `false` when a conditional move decided not to write.
    pub write: bool,
    /// New HI value, if the operation writes HI.
    pub hi: Option<RegisterValue>,
    /// New LO value, if the operation writes LO.
    pub lo: Option<RegisterValue>,
}

impl AluOutput {
    const fn value(value: u32) -> Self {
        Self {
            value: RegisterValue::new(value as u64),
            write: true,
            hi: None,
            lo: None,
        }
    }

    const fn hi_lo(hi: u32, lo: u32) -> Self {
        Self {
            value: RegisterValue::ZERO,
            write: true,
            hi: Some(RegisterValue::new(hi as u64)),
            lo: Some(RegisterValue::new(lo as u64)),
        }
    }
}

/// Arithmetic Logic Unit (ALU) for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform.
    /// * `a`  - First operand (`rs`).
    /// * `b`  - Second operand (`rt` or the extended immediate).
    /// * `sa` - Constant shift amount for `Sll`/`Srl`/`Sra`.
    /// * `hi` - Current HI value, read by `Mfhi`.
    /// * `lo` - Current LO value, read by `Mflo`.
    ///
    /// # Returns
    ///
    /// The operation's output, or the exception cause for signed overflow and
    /// unsupported operations. Division by zero is not an error: the quotient
    /// is all ones and the remainder is the dividend.
    ///
    /// # Examples
    ///
    /// ```
    /// use mipsim_core::common::RegisterValue;
    /// use mipsim_core::core::pipeline::signals::AluOp;
    /// use mipsim_core::core::units::alu::Alu;
    ///
    /// let r = |v: u32| RegisterValue::from(v);
    /// let out = Alu::execute(AluOp::Addu, r(40), r(2), 0, r(0), r(0)).unwrap();
    /// assert_eq!(out.value.as_u32(), 42);
    ///
    /// let out = Alu::execute(AluOp::Sll, r(0), r(1), 4, r(0), r(0)).unwrap();
    /// assert_eq!(out.value.as_u32(), 0x10);
    ///
    /// assert!(Alu::execute(AluOp::Add, r(0x7fff_ffff), r(1), 0, r(0), r(0)).is_err());
    /// ```
    pub fn execute(
        op: AluOp,
        a: RegisterValue,
        b: RegisterValue,
        sa: u8,
        hi: RegisterValue,
        lo: RegisterValue,
    ) -> Result<AluOutput, ExceptionCause> {
        let (a, b) = (a.as_u32(), b.as_u32());
        match op {
            AluOp::Add | AluOp::Addu | AluOp::Sub | AluOp::Subu => {
                arithmetic::add_sub(op, a, b).map(AluOutput::value)
            }
            AluOp::Mult | AluOp::Multu | AluOp::Div | AluOp::Divu => {
                let (hi, lo) = arithmetic::mul_div(op, a, b);
                Ok(AluOutput::hi_lo(hi, lo))
            }

            AluOp::And
            | AluOp::Or
            | AluOp::Xor
            | AluOp::Nor
            | AluOp::Slt
            | AluOp::Sltu
            | AluOp::Lui => Ok(AluOutput::value(logic::execute(op, a, b))),

            AluOp::Sll | AluOp::Srl | AluOp::Sra | AluOp::Sllv | AluOp::Srlv | AluOp::Srav => {
                Ok(AluOutput::value(shifts::execute(op, a, b, sa)))
            }

            AluOp::Mfhi => Ok(AluOutput::value(hi.as_u32())),
            AluOp::Mflo => Ok(AluOutput::value(lo.as_u32())),
            AluOp::Mthi => Ok(AluOutput {
                hi: Some(RegisterValue::from(a)),
                ..AluOutput::default()
            }),
            AluOp::Mtlo => Ok(AluOutput {
                lo: Some(RegisterValue::from(a)),
                ..AluOutput::default()
            }),
            AluOp::Movz | AluOp::Movn => {
                let mut out = AluOutput::value(a);
                out.write = (b == 0) == matches!(op, AluOp::Movz);
                Ok(out)
            }

            AluOp::Unsupported => Err(ExceptionCause::UnsupportedAluOperation),
        }
    }
}
