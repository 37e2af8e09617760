//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the entry types carried between the five stages:
//! Fetch → Decode → Execute → Memory → Writeback.
//!
//! 1. **Instruction Flow:** Each entry carries the instruction, its PC and the values
//!    computed so far.
//! 2. **Bubbles:** The default entry is a no-op with `valid == false`; squashed and
//!    stalled slots hold bubbles.
//! 3. **Exception Propagation:** A cause raised in any stage rides along until the
//!    memory stage commits it.

use serde::Serialize;

use crate::common::{Address, ExceptionCause, RegisterValue};
use crate::core::pipeline::signals::ControlSignals;
use crate::isa::Instruction;

/// Where an execute-stage operand came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ForwardFrom {
    /// Read from the register file in decode.
    #[default]
    None,
    /// Bypassed from the instruction one stage ahead (its execute result).
    Memory,
    /// Bypassed from the instruction two stages ahead (its memory result).
    Writeback,
}

/// Entry in the IF/ID pipeline latch (Fetch to Decode stage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IfIdEntry {
    /// Slot holds a real instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: Address,
    /// Raw instruction word.
    pub code: u32,
    /// Exception raised while fetching.
    pub cause: ExceptionCause,
}

/// Entry in the ID/EX pipeline latch (Decode to Execute stage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdExEntry {
    /// Slot holds a real instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: Address,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Control signals for downstream pipeline stages.
    pub ctrl: ControlSignals,
    /// Value of `rs`.
    pub rs_val: RegisterValue,
    /// Value of `rt`.
    pub rt_val: RegisterValue,
    /// Value of HI.
    pub hi: RegisterValue,
    /// Value of LO.
    pub lo: RegisterValue,
    /// Extended immediate.
    pub imm: u32,
    /// Source of `rs_val`.
    pub fwd_rs: ForwardFrom,
    /// Source of `rt_val`.
    pub fwd_rt: ForwardFrom,
    /// Exception raised so far.
    pub cause: ExceptionCause,
}

/// Entry in the EX/MEM pipeline latch (Execute to Memory stage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExMemEntry {
    /// Slot holds a real instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: Address,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Control signals for downstream pipeline stages.
    pub ctrl: ControlSignals,
    /// ALU result, return address, or effective address for memory operations.
    pub alu: RegisterValue,
    /// Register value stored by stores and merged by LWL/LWR.
    pub store_data: RegisterValue,
    /// `false` when a conditional move chose not to write.
    pub write: bool,
    /// New HI value.
    pub hi: Option<RegisterValue>,
    /// New LO value.
    pub lo: Option<RegisterValue>,
    /// Branch or jump redirects fetch.
    pub taken: bool,
    /// Redirect target.
    pub target: Address,
    /// Exception raised so far.
    pub cause: ExceptionCause,
}

impl ExMemEntry {
    /// Returns `true` if the entry will write general-purpose register `reg`.
    pub const fn writes_gp(&self, reg: u8) -> bool {
        self.valid && self.ctrl.reg_write && self.write && self.ctrl.dest == reg && reg != 0
    }
}

/// One data memory access, recorded for traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MemAccessRecord {
    /// Effective address.
    pub addr: Address,
    /// `true` for stores.
    pub write: bool,
    /// Value loaded or stored.
    pub value: u32,
}

/// Entry in the MEM/WB pipeline latch (Memory to Writeback stage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemWbEntry {
    /// Slot holds a real instruction.
    pub valid: bool,
    /// Program counter of the instruction.
    pub pc: Address,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Control signals for the writeback stage.
    pub ctrl: ControlSignals,
    /// Final value of the destination register.
    pub value: RegisterValue,
    /// Destination register is written.
    pub reg_write: bool,
    /// New HI value.
    pub hi: Option<RegisterValue>,
    /// New LO value.
    pub lo: Option<RegisterValue>,
    /// Data access performed in the memory stage.
    pub mem_access: Option<MemAccessRecord>,
    /// Cause committed in the memory stage (informational; committed entries are no-ops).
    pub cause: ExceptionCause,
}

impl MemWbEntry {
    /// Returns `true` if the entry will write general-purpose register `reg`.
    pub const fn writes_gp(&self, reg: u8) -> bool {
        self.valid && self.reg_write && self.ctrl.dest == reg && reg != 0
    }
}
