//! Architectural register file.
//!
//! This module provides the `RegisterFile` struct holding the MIPS32 programmer-visible state.
//! It provides:
//! 1. **Storage:** 32 general-purpose registers, the HI/LO multiply-divide pair, and the PC.
//! 2. **Hard-wired Zero:** Writes to `$0` are discarded and reads always return zero.
//! 3. **Observability:** A dump helper used by reports and test diagnostics.

use super::addr::Address;
use super::constants::REGISTER_COUNT;
use super::data::RegisterValue;

/// MIPS32 register file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    gp: [RegisterValue; REGISTER_COUNT],
    hi: RegisterValue,
    lo: RegisterValue,
    pc: Address,
}

impl RegisterFile {
    /// Creates a register file with every register cleared and the PC at `reset_pc`.
    pub fn new(reset_pc: Address) -> Self {
        Self {
            pc: reset_pc,
            ..Self::default()
        }
    }

    /// Reads a general-purpose register. `$0` always reads as zero.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    #[inline(always)]
    pub fn read_gp(&self, idx: u8) -> RegisterValue {
        if idx == 0 {
            return RegisterValue::ZERO;
        }
        self.gp[usize::from(idx) % REGISTER_COUNT]
    }

    /// Writes a general-purpose register. Writes to `$0` are ignored.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The value to store.
    #[inline(always)]
    pub fn write_gp(&mut self, idx: u8, val: RegisterValue) {
        if idx != 0 {
            self.gp[usize::from(idx) % REGISTER_COUNT] = val;
        }
    }

    /// Reads the HI register.
    pub const fn read_hi(&self) -> RegisterValue {
        self.hi
    }

    /// Reads the LO register.
    pub const fn read_lo(&self) -> RegisterValue {
        self.lo
    }

    /// Writes the HI register.
    pub fn write_hi(&mut self, val: RegisterValue) {
        self.hi = val;
    }

    /// Writes the LO register.
    pub fn write_lo(&mut self, val: RegisterValue) {
        self.lo = val;
    }

    /// Current program counter.
    pub const fn read_pc(&self) -> Address {
        self.pc
    }

    /// Overwrites the program counter.
    pub fn write_pc(&mut self, pc: Address) {
        self.pc = pc;
    }

    /// Advances the program counter by one instruction word.
    pub fn pc_inc(&mut self) {
        self.pc = Address::from(self.pc.as_u32().wrapping_add(4));
    }

    /// Clears every register and moves the PC to `reset_pc`.
    pub fn reset(&mut self, reset_pc: Address) {
        *self = Self::new(reset_pc);
    }

    /// Prints all registers to stdout, four per line.
    pub fn dump(&self) {
        for row in 0..REGISTER_COUNT / 4 {
            let line: Vec<String> = (0..4)
                .map(|col| {
                    let idx = row * 4 + col;
                    format!("${idx:<2}={:08x}", self.gp[idx].as_u32())
                })
                .collect();
            println!("{}", line.join(" "));
        }
        println!(
            "HI={:08x} LO={:08x} PC={}",
            self.hi.as_u32(),
            self.lo.as_u32(),
            self.pc
        );
    }
}
