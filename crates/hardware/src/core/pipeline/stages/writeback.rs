//! Writeback (WB) Stage.
//!
//! This module implements the final stage of the instruction pipeline.
//! It commits results to the general-purpose register file and HI/LO,
//! and counts retired instructions.

use tracing::trace;

use crate::core::Cpu;
use crate::core::pipeline::latches::MemWbEntry;
use crate::core::pipeline::state::{Stage, StageSnapshot};

/// Writes one MEM/WB entry back to the register file.
pub(crate) fn writeback_entry(cpu: &mut Cpu, entry: &MemWbEntry) {
    if !entry.valid {
        return;
    }
    if entry.reg_write {
        trace!(reg = entry.ctrl.dest, value = %entry.value, "writeback");
        cpu.regs.write_gp(entry.ctrl.dest, entry.value);
        cpu.state.reg_write = Some((entry.ctrl.dest, entry.value));
    }
    if let Some(hi) = entry.hi {
        cpu.regs.write_hi(hi);
        cpu.state.hi_write = Some(hi);
    }
    if let Some(lo) = entry.lo {
        cpu.regs.write_lo(lo);
        cpu.state.lo_write = Some(lo);
    }
    // Stepped-over exceptions retire as no-ops.
    if entry.cause.is_none() || cpu.config.exceptions.step_over(entry.cause) {
        cpu.stats.retire(entry.inst.kind());
    }
}

/// Executes the writeback stage of the pipeline.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn wb_stage(cpu: &mut Cpu) {
    let entry = cpu.state.mem_wb;
    cpu.state.set_stage(
        Stage::Writeback,
        StageSnapshot {
            valid: entry.valid,
            pc: entry.pc,
            code: entry.inst.code(),
            cause: entry.cause,
        },
    );
    writeback_entry(cpu, &entry);
}
