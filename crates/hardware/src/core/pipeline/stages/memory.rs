//! Memory Access (MEM) Stage.
//!
//! This module implements the fourth stage of the instruction pipeline, which is also
//! the commit point. It performs:
//! 1. **Interrupt Sampling:** A pending, unmasked interrupt replaces the arriving instruction.
//! 2. **Exception Commit:** Enters the coprocessor 0 handler when `Status.IE` allows it,
//!    and otherwise applies the per-cause stop and step-over policy.
//! 3. **Data Access:** Loads and stores through the data cache.
//! 4. **Coprocessor 0:** `MTC0` writes and `ERET` take effect here.
//! 5. **Branch Resolution:** When configured to resolve here, redirects fetch.

use tracing::{debug, trace};

use crate::common::cop0::EXC_CODE_ADDRESS_STORE;
use crate::common::{Address, ExceptionCause};
use crate::config::BranchStage;
use crate::core::Cpu;
use crate::core::pipeline::latches::{ExMemEntry, MemAccessRecord, MemWbEntry};
use crate::core::pipeline::state::{CoreStatus, Stage, StageSnapshot};

/// Performs the memory stage for one EX/MEM entry.
///
/// # Returns
///
/// The MEM/WB entry and, if the committed cause is configured to stop the run loop,
/// that cause.
pub(crate) fn memory_entry(
    cpu: &mut Cpu,
    entry: &ExMemEntry,
) -> (MemWbEntry, Option<ExceptionCause>) {
    let mut out = MemWbEntry {
        valid: entry.valid,
        pc: entry.pc,
        inst: entry.inst,
        ctrl: entry.ctrl,
        value: entry.alu,
        reg_write: entry.ctrl.reg_write && entry.write,
        hi: entry.hi,
        lo: entry.lo,
        mem_access: None,
        cause: entry.cause,
    };
    if !entry.valid {
        return (out, None);
    }

    if out.cause.is_none() && cpu.interrupt_pending() {
        out.cause = ExceptionCause::Interrupt;
    }

    if out.cause.is_some() {
        let cause = out.cause;
        debug!(pc = %entry.pc, %cause, "exception committed");
        cpu.state.last_exception = cause;
        cpu.stats.record_exception(cause);
        if cpu.cop0.vectoring_enabled() {
            cpu.trap_redirect = Some(enter_handler(cpu, entry, cause));
        } else if !cpu.config.exceptions.step_over(cause) {
            cpu.state.status = CoreStatus::Trapped(cause);
        }
        cpu.after_control = false;
        out.reg_write = false;
        out.hi = None;
        out.lo = None;
        let stop = cpu.config.exceptions.stop_on(cause).then_some(cause);
        return (out, stop);
    }

    let ctrl = &entry.ctrl;
    cpu.after_control = ctrl.is_control();
    if ctrl.cop0_write {
        let value = entry.store_data.as_u32();
        trace!(rd = entry.inst.rd(), sel = entry.inst.sel(), value, "mtc0");
        let _ = cpu.cop0.write(entry.inst.rd(), entry.inst.sel(), value);
    } else if ctrl.eret {
        let target = cpu.cop0.eret();
        debug!(pc = %entry.pc, %target, "exception return");
        cpu.trap_redirect = Some(target);
    }

    let addr = Address::from(entry.alu.as_u32());
    if ctrl.mem_read {
        let value = cpu.mem.read(addr, ctrl.mem_ctl, entry.store_data.as_u32());
        trace!(%addr, value, "load");
        out.value = value.into();
        out.mem_access = Some(MemAccessRecord {
            addr,
            write: false,
            value,
        });
    } else if ctrl.mem_write {
        let value = entry.store_data.as_u32();
        let _ = cpu.mem.write(addr, ctrl.mem_ctl, value);
        trace!(%addr, value, "store");
        out.mem_access = Some(MemAccessRecord {
            addr,
            write: true,
            value,
        });
    }
    (out, None)
}

/// Records `cause` in coprocessor 0 and returns the handler address.
///
/// An instruction committing right after a branch or jump sits in its delay slot;
/// EPC then names the branch so the pair restarts together.
fn enter_handler(cpu: &mut Cpu, entry: &ExMemEntry, cause: ExceptionCause) -> Address {
    let in_delay_slot = cpu.config.delay_slot && cpu.after_control;
    let data_addr = Address::from(entry.alu.as_u32());
    let (exc_code, bad_vaddr) = match cause {
        ExceptionCause::UnalignedAddress if entry.ctrl.mem_write => {
            (EXC_CODE_ADDRESS_STORE, Some(data_addr))
        }
        ExceptionCause::UnalignedAddress => (cause.exc_code(), Some(data_addr)),
        ExceptionCause::UnalignedJump => (cause.exc_code(), Some(entry.target)),
        _ => (cause.exc_code(), None),
    };
    let vector = cpu
        .cop0
        .enter_exception(exc_code, entry.pc, in_delay_slot, bad_vaddr);
    debug!(pc = %entry.pc, %vector, exc_code, in_delay_slot, "entering exception handler");
    vector
}

/// Executes the memory stage of the pipeline.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
///
/// # Returns
///
/// The committed cause if it is configured to stop the run loop.
pub fn mem_stage(cpu: &mut Cpu) -> Option<ExceptionCause> {
    let entry = cpu.state.ex_mem;
    let (out, stop) = memory_entry(cpu, &entry);
    cpu.state.set_stage(
        Stage::Memory,
        StageSnapshot {
            valid: entry.valid,
            pc: entry.pc,
            code: entry.inst.code(),
            cause: out.cause,
        },
    );
    cpu.state.mem_access = out.mem_access;
    cpu.state.mem_wb = out;

    if let Some(target) = cpu.trap_redirect.take() {
        cpu.flush_to(target);
    } else if cpu.config.branch_stage == BranchStage::Memory
        && entry.taken
        && out.cause.is_none()
    {
        cpu.redirect(entry.target, Stage::Memory);
    }
    stop
}
