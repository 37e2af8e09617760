//! Single-instruction assembler.
//!
//! Parses one line of the syntax produced by the disassembler back into an
//! instruction word. It provides:
//! 1. **Operands:** `$n`/`$name` registers, signed decimal or `0x` hex numbers, and
//!    `offset($base)` memory operands.
//! 2. **Targets:** Absolute branch and jump targets, converted to PC-relative offsets or
//!    26-bit region indices using the instruction address.
//! 3. **Encoding:** Results go through [`encode`], so parse and encode agree bit for bit.

use crate::common::{Address, ParseError};
use crate::isa::abi::register_index;
use crate::isa::encode::{Fields, encode};
use crate::isa::instruction::{Opcode, Syntax};

/// Parses one instruction.
///
/// # Arguments
///
/// * `text` - The instruction text, e.g. `addu $3, $1, $2`.
/// * `pc` - Address the instruction will live at; needed for branch and jump targets.
///
/// # Returns
///
/// The encoded instruction word, or a `ParseError` naming the mnemonic and the
/// offending text.
pub fn parse(text: &str, pc: Address) -> Result<u32, ParseError> {
    let text = text.trim();
    let (mnemonic, rest) = text
        .split_once(char::is_whitespace)
        .map_or((text, ""), |(m, r)| (m, r.trim()));

    if mnemonic.eq_ignore_ascii_case("nop") && rest.is_empty() {
        return Ok(0);
    }
    let op = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| ParseError::UnknownMnemonic(mnemonic.to_string()))?;

    let operands: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(',').map(str::trim).collect()
    };
    let bad = || ParseError::Operands {
        mnemonic: op.mnemonic().to_string(),
        text: rest.to_string(),
    };

    let reg = |s: &str| register_index(s).ok_or_else(bad);
    let mut f = Fields::default();

    match (op.syntax(), operands.as_slice()) {
        (Syntax::ShiftImmediate, [rd, rt, sa]) => {
            f.rd = reg(rd)?;
            f.rt = reg(rt)?;
            f.shamt = u8::try_from(parse_number(sa).ok_or_else(bad)?)
                .ok()
                .filter(|v| *v < 32)
                .ok_or_else(bad)?;
        }
        (Syntax::ShiftVariable, [rd, rt, rs]) => {
            f.rd = reg(rd)?;
            f.rt = reg(rt)?;
            f.rs = reg(rs)?;
        }
        (Syntax::JumpRegister | Syntax::MoveTo, [rs]) => f.rs = reg(rs)?,
        (Syntax::JumpRegisterLink, [rd, rs]) => {
            f.rd = reg(rd)?;
            f.rs = reg(rs)?;
        }
        (Syntax::JumpRegisterLink, [rs]) => {
            f.rd = crate::isa::abi::REG_RA;
            f.rs = reg(rs)?;
        }
        (Syntax::ThreeRegister, [rd, rs, rt]) => {
            f.rd = reg(rd)?;
            f.rs = reg(rs)?;
            f.rt = reg(rt)?;
        }
        (Syntax::SourcePair, [rs, rt]) => {
            f.rs = reg(rs)?;
            f.rt = reg(rt)?;
        }
        (Syntax::MoveFrom, [rd]) => f.rd = reg(rd)?,
        (Syntax::Code, []) => {}
        (Syntax::Code, [code]) => {
            f.code = u32::try_from(parse_number(code).ok_or_else(bad)?)
                .ok()
                .filter(|v| *v <= 0xF_FFFF)
                .ok_or_else(bad)?;
        }
        (Syntax::BranchZero, [rs, target]) => {
            f.rs = reg(rs)?;
            f.imm = branch_offset(pc, target).ok_or_else(bad)?;
        }
        (Syntax::BranchCompare, [rs, rt, target]) => {
            f.rs = reg(rs)?;
            f.rt = reg(rt)?;
            f.imm = branch_offset(pc, target).ok_or_else(bad)?;
        }
        (Syntax::Jump, [target]) => {
            let target = u32::try_from(parse_number(target).ok_or_else(bad)?)
                .ok()
                .ok_or_else(bad)?;
            f.target = (target >> 2) & crate::isa::instruction::TARGET_MASK;
        }
        (Syntax::Immediate, [rt, rs, imm]) => {
            f.rt = reg(rt)?;
            f.rs = reg(rs)?;
            f.imm = immediate16(parse_number(imm).ok_or_else(bad)?).ok_or_else(bad)?;
        }
        (Syntax::UpperImmediate, [rt, imm]) => {
            f.rt = reg(rt)?;
            f.imm = immediate16(parse_number(imm).ok_or_else(bad)?).ok_or_else(bad)?;
        }
        (Syntax::Memory, [rt, mem]) => {
            f.rt = reg(rt)?;
            let (offset, base) = mem
                .strip_suffix(')')
                .and_then(|m| m.split_once('('))
                .ok_or_else(bad)?;
            f.rs = reg(base)?;
            f.imm = if offset.trim().is_empty() {
                0
            } else {
                immediate16(parse_number(offset).ok_or_else(bad)?).ok_or_else(bad)?
            };
        }
        (Syntax::Coprocessor, [rt, rd]) => {
            f.rt = reg(rt)?;
            f.rd = reg(rd)?;
        }
        (Syntax::Coprocessor, [rt, rd, sel]) => {
            f.rt = reg(rt)?;
            f.rd = reg(rd)?;
            f.sel = u8::try_from(parse_number(sel).ok_or_else(bad)?)
                .ok()
                .filter(|v| *v < 8)
                .ok_or_else(bad)?;
        }
        (Syntax::Bare, []) => {}
        _ => return Err(bad()),
    }

    Ok(encode(op, f))
}

/// Parses a signed decimal or `0x`-prefixed hex number.
fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, digits) = text
        .strip_prefix('-')
        .map_or((false, text), |rest| (true, rest));
    let value = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}

/// Truncates a number to a 16-bit immediate field, accepting signed or unsigned forms.
fn immediate16(value: i64) -> Option<u16> {
    (-0x8000..=0xFFFF).contains(&value).then_some(value as u16)
}

/// Converts an absolute branch target into the encoded word offset.
fn branch_offset(pc: Address, target: &str) -> Option<u16> {
    let target = u32::try_from(parse_number(target)?).ok()?;
    let delta = target.wrapping_sub(pc.as_u32().wrapping_add(4)) as i32;
    if delta & 3 != 0 {
        return None;
    }
    i16::try_from(delta >> 2).ok().map(|off| off as u16)
}
