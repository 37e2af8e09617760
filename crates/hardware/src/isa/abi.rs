//! MIPS o32 ABI register names.
//!
//! Maps symbolic register names to indices for the textual parser and report output.

/// ABI names for `$0`..`$31`.
pub const REG_NAMES: [&str; 32] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", "t0", "t1", "t2", "t3", "t4", "t5", "t6",
    "t7", "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", "t8", "t9", "k0", "k1", "gp", "sp",
    "fp", "ra",
];

/// Register `$29` (stack pointer).
pub const REG_SP: u8 = 29;

/// Register `$31` (return address).
pub const REG_RA: u8 = 31;

/// Resolves a register operand written as `$n` or `$name`.
///
/// # Arguments
///
/// * `text` - Operand text including the leading `$`.
///
/// # Returns
///
/// The register index, or `None` if the text names no register.
pub fn register_index(text: &str) -> Option<u8> {
    let name = text.trim().strip_prefix('$')?;
    if let Ok(n) = name.parse::<u8>() {
        return (n < 32).then_some(n);
    }
    let name = if name == "s8" { "fp" } else { name };
    REG_NAMES
        .iter()
        .position(|candidate| *candidate == name)
        .map(|idx| idx as u8)
}
