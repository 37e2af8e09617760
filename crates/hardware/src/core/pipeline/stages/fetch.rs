//! Instruction Fetch (IF) Stage.
//!
//! Reads the instruction word at the PC through the program cache and advances
//! the PC sequentially. Redirects are applied by the stage that resolves the
//! branch, by overwriting the PC before fetch runs.

use tracing::trace;

use crate::common::{Address, ExceptionCause};
use crate::core::Cpu;
use crate::core::pipeline::latches::IfIdEntry;
use crate::core::pipeline::state::{Stage, StageSnapshot};

/// Fetches the instruction at `pc`.
pub(crate) fn fetch(cpu: &mut Cpu, pc: Address) -> IfIdEntry {
    let code = cpu.mem.fetch_word(pc);
    trace!(%pc, code = format_args!("{code:#010x}"), "fetch");
    IfIdEntry {
        valid: true,
        pc,
        code,
        cause: ExceptionCause::None,
    }
}

/// Executes the fetch stage of the pipeline.
///
/// # Arguments
///
/// * `cpu` - Mutable reference to the CPU state.
pub fn fetch_stage(cpu: &mut Cpu) {
    let pc = cpu.regs.read_pc();
    let entry = fetch(cpu, pc);
    cpu.regs.write_pc(Address::from(pc.as_u32().wrapping_add(4)));
    cpu.state.set_stage(
        Stage::Fetch,
        StageSnapshot {
            valid: true,
            pc,
            code: entry.code,
            cause: entry.cause,
        },
    );
    cpu.state.if_id = entry;
}
