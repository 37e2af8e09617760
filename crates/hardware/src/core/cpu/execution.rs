//! Main Execution Loop.
//!
//! This module implements the core execution cycle of the CPU. It performs the following:
//! 1. **Pipeline Coordination:** Runs the five stages in reverse order so every stage
//!    consumes the latch its predecessor wrote during the previous cycle.
//! 2. **Single-Cycle Mode:** Runs one instruction through every stage within one cycle.
//! 3. **Exception Stops:** Reports causes configured to stop the run loop and applies
//!    handler entry and `ERET` redirects decided at the commit point.
//! 4. **Timing Management:** Counts cycles and enforces the configured cycle limit.

use tracing::{debug, info};

use super::Cpu;
use crate::common::{Address, ExceptionCause};
use crate::core::pipeline::latches::{ExMemEntry, IdExEntry, IfIdEntry, MemWbEntry};
use crate::core::pipeline::stages::{
    decode::decode_entry, decode_stage, execute::execute_entry, execute_stage, fetch::fetch,
    fetch_stage, mem_stage, memory::memory_entry, wb_stage, writeback::writeback_entry,
};
use crate::core::pipeline::state::{CoreStatus, Stage, StageSnapshot};

impl Cpu {
    /// Advances the core by one clock cycle.
    ///
    /// Does nothing once the core has trapped or halted.
    ///
    /// # Returns
    ///
    /// The exception cause committed this cycle if it is configured to stop the run loop.
    pub fn step(&mut self) -> Option<ExceptionCause> {
        if !self.state.is_running() {
            return None;
        }
        self.state.begin_cycle();

        let stop = if self.config.pipelined {
            self.step_pipelined()
        } else {
            self.step_single()
        };

        self.state.cycle_count += 1;
        self.stats.cycles += 1;
        self.cop0.advance(1);
        if self.mem.poll_external_changes() > 0 {
            debug!(cycle = self.state.cycle_count, "address space changed externally");
        }

        let limit_reached = self
            .config
            .cycle_limit
            .is_some_and(|limit| self.state.cycle_count >= limit);
        if limit_reached && self.state.is_running() {
            info!(cycles = self.state.cycle_count, "cycle limit reached");
            self.state.status = CoreStatus::Halted;
        }
        stop
    }

    /// One cycle of the five-stage pipeline.
    fn step_pipelined(&mut self) -> Option<ExceptionCause> {
        wb_stage(self);
        let stop = mem_stage(self);
        if !self.state.is_running() {
            return stop;
        }
        execute_stage(self);
        if !decode_stage(self) {
            fetch_stage(self);
        }
        stop
    }

    /// One instruction through every stage within a single cycle.
    fn step_single(&mut self) -> Option<ExceptionCause> {
        let pc = self.regs.read_pc();
        let fetched = fetch(self, pc);
        let decoded = decode_entry(self, &fetched);
        let executed = execute_entry(&decoded, self.config.delay_slot, &self.cop0);
        let (committed, stop) = memory_entry(self, &executed);
        writeback_entry(self, &committed);

        let snapshot = StageSnapshot {
            valid: true,
            pc,
            code: fetched.code,
            cause: committed.cause,
        };
        for stage in Stage::ALL {
            self.state.set_stage(stage, snapshot);
        }
        self.state.mem_access = committed.mem_access;
        self.record_latches(fetched, decoded, executed, committed);

        if !self.state.is_running() {
            return stop;
        }
        if let Some(target) = self.trap_redirect.take() {
            self.pending_branch = None;
            self.regs.write_pc(target);
            return stop;
        }

        let mut next = self
            .pending_branch
            .take()
            .unwrap_or_else(|| Address::from(pc.as_u32().wrapping_add(4)));
        if executed.taken && committed.cause.is_none() {
            self.stats.branches_taken += 1;
            if self.config.delay_slot {
                self.pending_branch = Some(executed.target);
            } else {
                next = executed.target;
            }
        }
        self.regs.write_pc(next);
        stop
    }

    /// Keeps the latches observable in single-cycle mode.
    const fn record_latches(
        &mut self,
        if_id: IfIdEntry,
        id_ex: IdExEntry,
        ex_mem: ExMemEntry,
        mem_wb: MemWbEntry,
    ) {
        self.state.if_id = if_id;
        self.state.id_ex = id_ex;
        self.state.ex_mem = ex_mem;
        self.state.mem_wb = mem_wb;
    }
}
