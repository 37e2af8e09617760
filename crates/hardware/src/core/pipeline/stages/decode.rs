//! Instruction Decode (ID) Stage.
//!
//! This module implements the second stage of the instruction pipeline. It performs:
//! 1. **Decoding:** Turns the fetched word into an instruction and its control signals;
//!    unsupported encodings become an `UnsupportedInstruction` exception tag.
//! 2. **Register Read:** Reads `rs`, `rt`, HI and LO from the register file.
//! 3. **Hazard Handling:** Consults the hazard unit to forward operands or stall.

use tracing::trace;

use crate::common::ExceptionCause;
use crate::core::Cpu;
use crate::core::pipeline::hazards::{self, Operand, Source};
use crate::core::pipeline::latches::{ForwardFrom, IdExEntry, IfIdEntry};
use crate::core::pipeline::signals::ControlSignals;
use crate::core::pipeline::state::{Stage, StageSnapshot};
use crate::isa::{Instruction, decode};

/// Decodes an IF/ID entry and reads its operands from the register file.
pub(crate) fn decode_entry(cpu: &Cpu, entry: &IfIdEntry) -> IdExEntry {
    if !entry.valid {
        return IdExEntry::default();
    }
    let (inst, cause) = match decode(entry.code) {
        Ok(inst) => (inst, entry.cause),
        Err(err) => {
            trace!(pc = %entry.pc, %err, "decode failed");
            let cause = if entry.cause.is_some() {
                entry.cause
            } else {
                ExceptionCause::UnsupportedInstruction
            };
            (Instruction::NOP, cause)
        }
    };
    let ctrl = ControlSignals::from_instruction(&inst);
    IdExEntry {
        valid: true,
        pc: entry.pc,
        inst,
        ctrl,
        rs_val: cpu.regs.read_gp(inst.rs()),
        rt_val: cpu.regs.read_gp(inst.rt()),
        hi: cpu.regs.read_hi(),
        lo: cpu.regs.read_lo(),
        imm: inst.immediate(),
        fwd_rs: ForwardFrom::None,
        fwd_rt: ForwardFrom::None,
        cause,
    }
}

/// Executes the decode stage of the pipeline.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
///
/// # Returns
///
/// `true` if decode stalled: the IF/ID latch and the PC are held and a bubble
/// enters ID/EX.
pub fn decode_stage(cpu: &mut Cpu) -> bool {
    let entry = cpu.state.if_id;
    let mut out = decode_entry(cpu, &entry);
    cpu.state.set_stage(
        Stage::Decode,
        StageSnapshot {
            valid: entry.valid,
            pc: entry.pc,
            code: entry.code,
            cause: out.cause,
        },
    );

    if out.valid && out.cause.is_none() {
        let unit = cpu.config.hazard_unit;
        let (rs, rt) = (out.inst.rs(), out.inst.rt());
        let (ex_mem, mem_wb) = (&cpu.state.ex_mem, &cpu.state.mem_wb);

        if hazards::need_stall(unit, &out.ctrl, rs, rt, ex_mem, mem_wb) {
            trace!(pc = %entry.pc, "decode stalled");
            cpu.state.id_ex = IdExEntry::default();
            cpu.state.stalled = true;
            cpu.state.stall_count += 1;
            cpu.stats.stalls += 1;
            return true;
        }

        for src in hazards::sources(&out.ctrl, rs, rt) {
            if let Operand::Forwarded(value, from) = hazards::resolve(unit, src, ex_mem, mem_wb) {
                match src {
                    Source::Gp(reg) if reg == rs && out.ctrl.reads_rs => {
                        out.rs_val = value;
                        out.fwd_rs = from;
                        if reg == rt && out.ctrl.reads_rt {
                            out.rt_val = value;
                            out.fwd_rt = from;
                        }
                    }
                    Source::Gp(_) => {
                        out.rt_val = value;
                        out.fwd_rt = from;
                    }
                    Source::Hi => out.hi = value,
                    Source::Lo => out.lo = value,
                }
            }
        }
    }

    cpu.state.id_ex = out;
    false
}
