//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the MIPS32 simulator. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, IPC).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch, jump, system).
//! 3. **Control flow:** Taken branches and squashed instructions.
//! 4. **Stalls:** Hazard stall cycles.
//! 5. **Exceptions:** Committed exceptions per cause.

use serde::Serialize;
use std::time::Instant;

use crate::common::ExceptionCause;
use crate::isa::instruction::OperationKind;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Cycles decode was held by a data hazard.
    pub stalls: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of ALU and shift instructions retired.
    pub inst_alu: u64,
    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of conditional branches retired.
    pub inst_branch: u64,
    /// Count of jumps retired.
    pub inst_jump: u64,
    /// Count of SYSCALL/BREAK instructions retired.
    pub inst_system: u64,

    /// Branches and jumps that redirected fetch.
    pub branches_taken: u64,
    /// Wrong-path instructions squashed.
    pub flushes: u64,

    /// Committed exceptions, indexed by [`ExceptionCause::index`].
    pub exceptions: [u64; ExceptionCause::COUNT],
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            stalls: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            inst_jump: 0,
            inst_system: 0,
            branches_taken: 0,
            flushes: 0,
            exceptions: [0; ExceptionCause::COUNT],
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"core"`, `"instruction_mix"`, `"exceptions"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "core", "instruction_mix", "exceptions"];

impl SimStats {
    /// Counts one retired instruction.
    pub fn retire(&mut self, kind: OperationKind) {
        self.instructions_retired += 1;
        match kind {
            OperationKind::Arithmetic
            | OperationKind::ArithmeticImmediate
            | OperationKind::Shift => self.inst_alu += 1,
            OperationKind::Load => self.inst_load += 1,
            OperationKind::Store => self.inst_store += 1,
            OperationKind::Branch => self.inst_branch += 1,
            OperationKind::Jump => self.inst_jump += 1,
            OperationKind::System => self.inst_system += 1,
        }
    }

    /// Counts one committed exception.
    pub fn record_exception(&mut self, cause: ExceptionCause) {
        self.exceptions[cause.index()] += 1;
    }

    /// Wall-clock seconds since the statistics were created.
    pub fn host_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.host_seconds();
        let cyc = self.cycles.max(1);
        let instr = self.instructions_retired.max(1);

        if want("summary") {
            let ipc = self.instructions_retired as f64 / cyc as f64;
            let cpi = cyc as f64 / instr as f64;
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("MIPS32 SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {khz:.2} kHz");
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {ipc:.4}");
            println!("sim_cpi                  {cpi:.4}");
            println!("----------------------------------------------------------");
        }
        if want("core") {
            println!("CORE BREAKDOWN");
            println!(
                "  stalls.data            {} ({:.2}%)",
                self.stalls,
                (self.stalls as f64 / cyc as f64) * 100.0
            );
            println!("  branches.taken         {}", self.branches_taken);
            println!("  flushes                {}", self.flushes);
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            let total_inst = instr as f64;
            println!("INSTRUCTION MIX");
            for (name, count) in [
                ("op.alu", self.inst_alu),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.jump", self.inst_jump),
                ("op.system", self.inst_system),
            ] {
                println!(
                    "  {name:<22} {count} ({:.2}%)",
                    (count as f64 / total_inst) * 100.0
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("exceptions") {
            println!("EXCEPTIONS");
            for cause in ExceptionCause::ALL.into_iter().filter(|c| c.is_some()) {
                let count = self.exceptions[cause.index()];
                if count > 0 {
                    println!("  {:<22} {count}", cause.name());
                }
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
