//! Execute (EX) Stage.
//!
//! This module implements the third stage of the instruction pipeline. It performs:
//! 1. **ALU Operations:** Arithmetic, logic, shifts, multiply/divide and HI/LO transfers.
//! 2. **Address Generation:** Effective addresses for loads and stores, with alignment checks.
//! 3. **Control Flow:** Branch conditions, jump targets and return addresses.
//! 4. **Coprocessor 0:** `MFC0` reads its register here; `MTC0` targets are checked.
//! 5. **Branch Resolution:** When configured to resolve here, redirects fetch and squashes
//!    wrong-path instructions.

use tracing::trace;

use crate::common::{Address, Cop0Register, Cop0State, ExceptionCause, RegisterValue};
use crate::config::BranchStage;
use crate::core::Cpu;
use crate::core::pipeline::latches::{ExMemEntry, IdExEntry};
use crate::core::pipeline::signals::OpBSrc;
use crate::core::pipeline::state::{Stage, StageSnapshot};
use crate::core::units::alu::Alu;
use crate::core::units::lsu::unaligned::is_aligned;
use crate::isa::disasm::{branch_target, jump_target};

/// Executes one ID/EX entry.
///
/// # Arguments
///
/// * `entry` - The decoded instruction and its operands.
/// * `delay_slot` - Delay slots are enabled; selects the return address.
/// * `cop0` - Coprocessor 0 as left by the instructions already committed.
pub(crate) fn execute_entry(entry: &IdExEntry, delay_slot: bool, cop0: &Cop0State) -> ExMemEntry {
    let mut out = ExMemEntry {
        valid: entry.valid,
        pc: entry.pc,
        inst: entry.inst,
        ctrl: entry.ctrl,
        store_data: entry.rt_val,
        write: true,
        cause: entry.cause,
        ..ExMemEntry::default()
    };
    if !entry.valid || entry.cause.is_some() {
        return out;
    }

    let ctrl = &entry.ctrl;
    if ctrl.syscall {
        out.cause = ExceptionCause::Syscall;
        return out;
    }
    if ctrl.brk {
        out.cause = ExceptionCause::Break;
        return out;
    }
    let (rd, sel) = (entry.inst.rd(), entry.inst.sel());
    if ctrl.cop0_read {
        match cop0.read(rd, sel) {
            Some(value) => out.alu = RegisterValue::from(value),
            None => out.cause = ExceptionCause::UnsupportedInstruction,
        }
        return out;
    }
    if ctrl.cop0_write && Cop0Register::from_index(rd, sel).is_none() {
        out.cause = ExceptionCause::UnsupportedInstruction;
        return out;
    }

    let b = match ctrl.b_src {
        OpBSrc::Reg2 => entry.rt_val,
        OpBSrc::Imm => RegisterValue::from(entry.imm),
    };
    match Alu::execute(ctrl.alu, entry.rs_val, b, entry.inst.shamt(), entry.hi, entry.lo) {
        Ok(result) => {
            out.alu = result.value;
            out.write = result.write;
            out.hi = result.hi;
            out.lo = result.lo;
        }
        Err(cause) => {
            out.cause = cause;
            return out;
        }
    }

    if (ctrl.mem_read || ctrl.mem_write)
        && !is_aligned(Address::from(out.alu.as_u32()), ctrl.mem_ctl)
    {
        out.cause = ExceptionCause::UnalignedAddress;
        return out;
    }

    if ctrl.is_control() {
        let step = if delay_slot { 8 } else { 4 };
        if ctrl.link {
            out.alu = RegisterValue::from(entry.pc.as_u32().wrapping_add(step));
            out.write = true;
        }
        if ctrl.jump {
            out.taken = true;
            out.target = jump_target(entry.pc, entry.inst.target());
        } else if ctrl.jump_reg {
            out.target = Address::from(entry.rs_val.as_u32());
            if !out.target.is_aligned(4) {
                out.cause = ExceptionCause::UnalignedJump;
                return out;
            }
            out.taken = true;
        } else {
            out.taken = ctrl.branch.taken(entry.rs_val.as_u32(), entry.rt_val.as_u32());
            out.target = branch_target(entry.pc, entry.imm);
        }
    }
    out
}

/// Executes the execute stage of the pipeline.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn execute_stage(cpu: &mut Cpu) {
    let entry = cpu.state.id_ex;
    let out = execute_entry(&entry, cpu.config.delay_slot, &cpu.cop0);
    cpu.state.set_stage(
        Stage::Execute,
        StageSnapshot {
            valid: entry.valid,
            pc: entry.pc,
            code: entry.inst.code(),
            cause: out.cause,
        },
    );
    trace!(pc = %entry.pc, alu = %out.alu, "execute");
    cpu.state.ex_mem = out;

    if cpu.config.branch_stage == BranchStage::Execute && out.taken && out.cause.is_none() {
        cpu.redirect(out.target, Stage::Execute);
    }
}
