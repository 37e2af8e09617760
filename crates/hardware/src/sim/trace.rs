//! Per-cycle textual trace.
//!
//! The tracer turns each `CoreState` into one line per enabled signal:
//! stage disassembly (prefixed with `!` when the stage carries an exception),
//! the fetch PC, register writes and data memory accesses.

use std::io::{self, Write};

use crate::common::constants::REGISTER_COUNT;
use crate::core::pipeline::state::{CoreState, Stage};
use crate::isa::disasm::disassemble;

/// Signals the tracer emits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TraceOptions {
    /// Instruction in fetch.
    pub fetch: bool,
    /// Instruction in decode.
    pub decode: bool,
    /// Instruction in execute.
    pub execute: bool,
    /// Instruction in memory.
    pub memory: bool,
    /// Instruction in writeback.
    pub writeback: bool,
    /// Fetch address.
    pub pc: bool,
    /// General-purpose registers whose writes are traced.
    pub gp: [bool; REGISTER_COUNT],
    /// HI writes.
    pub hi: bool,
    /// LO writes.
    pub lo: bool,
    /// Data loads.
    pub mem_read: bool,
    /// Data stores.
    pub mem_write: bool,
}

impl TraceOptions {
    /// Traces writes to register `reg`.
    pub fn trace_gp(&mut self, reg: u8) {
        if let Some(slot) = self.gp.get_mut(usize::from(reg)) {
            *slot = true;
        }
    }

    /// Traces writes to every general-purpose register.
    pub fn trace_all_gp(&mut self) {
        self.gp = [true; REGISTER_COUNT];
    }

    /// Returns `true` if no signal is enabled.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Formats `CoreState` snapshots as trace lines.
#[derive(Clone, Debug, Default)]
pub struct Tracer {
    options: TraceOptions,
}

impl Tracer {
    /// Creates a tracer emitting the signals in `options`.
    pub const fn new(options: TraceOptions) -> Self {
        Self { options }
    }

    /// Enabled signals.
    pub const fn options(&self) -> &TraceOptions {
        &self.options
    }

    /// Trace lines for one cycle.
    pub fn lines(&self, state: &CoreState) -> Vec<String> {
        let o = &self.options;
        let mut out = Vec::new();

        let stages = [
            (o.fetch, Stage::Fetch),
            (o.decode, Stage::Decode),
            (o.execute, Stage::Execute),
            (o.memory, Stage::Memory),
            (o.writeback, Stage::Writeback),
        ];
        for (_, stage) in stages.iter().filter(|(enabled, _)| *enabled) {
            let snap = state.stage(*stage);
            let marker = if snap.cause.is_some() { "!" } else { "" };
            let text = if snap.valid {
                disassemble(snap.code, snap.pc)
            } else {
                "nop".to_string()
            };
            out.push(format!("{}: {marker}{text}", stage.name()));
        }

        if o.pc {
            out.push(format!("PC: {:x}", state.if_id.pc));
        }
        if let Some((reg, value)) = state.reg_write {
            if o.gp[usize::from(reg)] {
                out.push(format!("GP {reg}: {:x}", value.as_u32()));
            }
        }
        if let Some(lo) = state.lo_write.filter(|_| o.lo) {
            out.push(format!("LO: {:x}", lo.as_u32()));
        }
        if let Some(hi) = state.hi_write.filter(|_| o.hi) {
            out.push(format!("HI: {:x}", hi.as_u32()));
        }
        if let Some(access) = state.mem_access {
            if access.write && o.mem_write {
                out.push(format!("MEM[{:x}]: WR {:x}", access.addr, access.value));
            } else if !access.write && o.mem_read {
                out.push(format!("MEM[{:x}]: RD {:x}", access.addr, access.value));
            }
        }
        out
    }

    /// Writes the trace lines for one cycle to `sink`.
    pub fn write_cycle(&self, state: &CoreState, sink: &mut dyn Write) -> io::Result<()> {
        for line in self.lines(state) {
            writeln!(sink, "{line}")?;
        }
        Ok(())
    }
}
