//! Data Hazard Detection and Forwarding.
//!
//! This module implements the logic for maintaining pipeline consistency when data
//! dependencies exist between instructions. It provides:
//! 1. **Hazard Detection:** Finds producers of the decoding instruction's sources in the
//!    EX/MEM latch (distance 1) and the MEM/WB latch (distance 2).
//! 2. **Operand Forwarding:** Resolves Read-After-Write (RAW) hazards by bypassing the
//!    register file when the configured unit allows it.
//! 3. **Load-Use Stalls:** A load one stage ahead cannot forward and stalls decode.
//!
//! The check runs in decode after writeback and memory have already produced this
//! cycle's latches, so a producer three instructions ahead has reached the register file.

use crate::common::RegisterValue;
use crate::config::HazardUnit;
use crate::core::pipeline::latches::{ExMemEntry, ForwardFrom, MemWbEntry};
use crate::core::pipeline::signals::ControlSignals;

/// Architectural source of an operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Source {
    /// General-purpose register.
    Gp(u8),
    /// HI register.
    Hi,
    /// LO register.
    Lo,
}

/// Resolution of one operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Use the register file value.
    RegisterFile,
    /// Use a bypassed value.
    Forwarded(RegisterValue, ForwardFrom),
    /// The value is not available yet.
    Stall,
}

/// Value produced for `src` by the instruction in EX/MEM, if any.
fn produced_by_ex_mem(ex_mem: &ExMemEntry, src: Source) -> Option<RegisterValue> {
    // A faulting instruction retires as a no-op and produces nothing.
    if !ex_mem.valid || ex_mem.cause.is_some() {
        return None;
    }
    match src {
        Source::Gp(reg) => ex_mem.writes_gp(reg).then_some(ex_mem.alu),
        Source::Hi => ex_mem.hi,
        Source::Lo => ex_mem.lo,
    }
}

/// Value produced for `src` by the instruction in MEM/WB, if any.
fn produced_by_mem_wb(mem_wb: &MemWbEntry, src: Source) -> Option<RegisterValue> {
    if !mem_wb.valid {
        return None;
    }
    match src {
        Source::Gp(reg) => mem_wb.writes_gp(reg).then_some(mem_wb.value),
        Source::Hi => mem_wb.hi,
        Source::Lo => mem_wb.lo,
    }
}

/// Resolves one source operand of the instruction in decode.
///
/// # Arguments
///
/// * `unit` - Configured hazard unit.
/// * `src` - The operand's architectural source.
/// * `ex_mem` - The EX/MEM latch written this cycle (distance 1).
/// * `mem_wb` - The MEM/WB latch written this cycle (distance 2).
///
/// # Returns
///
/// Whether to read the register file, use a forwarded value, or stall.
pub fn resolve(unit: HazardUnit, src: Source, ex_mem: &ExMemEntry, mem_wb: &MemWbEntry) -> Operand {
    if matches!(unit, HazardUnit::None) || matches!(src, Source::Gp(0)) {
        return Operand::RegisterFile;
    }

    if let Some(value) = produced_by_ex_mem(ex_mem, src) {
        // A load's data is only known after the memory stage.
        if matches!(unit, HazardUnit::Stall) || ex_mem.ctrl.mem_read {
            return Operand::Stall;
        }
        return Operand::Forwarded(value, ForwardFrom::Memory);
    }

    if let Some(value) = produced_by_mem_wb(mem_wb, src) {
        if matches!(unit, HazardUnit::Stall) {
            return Operand::Stall;
        }
        return Operand::Forwarded(value, ForwardFrom::Writeback);
    }

    Operand::RegisterFile
}

/// Lists the sources an instruction reads.
pub fn sources(ctrl: &ControlSignals, rs: u8, rt: u8) -> impl Iterator<Item = Source> + use<> {
    [
        ctrl.reads_rs.then_some(Source::Gp(rs)),
        ctrl.reads_rt.then_some(Source::Gp(rt)),
        ctrl.reads_hi.then_some(Source::Hi),
        ctrl.reads_lo.then_some(Source::Lo),
    ]
    .into_iter()
    .flatten()
}

/// Checks whether the instruction in decode must stall this cycle.
///
/// # Returns
///
/// `true` if any source operand resolves to [`Operand::Stall`].
pub fn need_stall(
    unit: HazardUnit,
    ctrl: &ControlSignals,
    rs: u8,
    rt: u8,
    ex_mem: &ExMemEntry,
    mem_wb: &MemWbEntry,
) -> bool {
    sources(ctrl, rs, rt).any(|src| resolve(unit, src, ex_mem, mem_wb) == Operand::Stall)
}
