//! Observable core state.
//!
//! `CoreState` is the snapshot handed to step observers after every cycle. It holds
//! the four pipeline latches (each stage's latched result), what every stage worked
//! on during the cycle, and the core-wide counters and status.

use serde::Serialize;

use crate::common::{Address, ExceptionCause, RegisterValue};
use crate::core::pipeline::latches::{
    ExMemEntry, IdExEntry, IfIdEntry, MemAccessRecord, MemWbEntry,
};

/// Run status of the core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum CoreStatus {
    /// Executing.
    #[default]
    Running,
    /// An exception that is not stepped over reached the commit point.
    Trapped(ExceptionCause),
    /// The configured cycle limit was reached.
    Halted,
}

/// What one stage processed during the last cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StageSnapshot {
    /// The stage held a real instruction (not a bubble).
    pub valid: bool,
    /// Address of the instruction.
    pub pc: Address,
    /// Raw instruction word.
    pub code: u32,
    /// Exception cause attached to the instruction.
    pub cause: ExceptionCause,
}

/// Pipeline stage identifiers, in pipeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Instruction fetch.
    Fetch,
    /// Instruction decode and register read.
    Decode,
    /// ALU and branch resolution.
    Execute,
    /// Data access and exception commit.
    Memory,
    /// Register write.
    Writeback,
}

impl Stage {
    /// Every stage in pipeline order.
    pub const ALL: [Self; 5] = [
        Self::Fetch,
        Self::Decode,
        Self::Execute,
        Self::Memory,
        Self::Writeback,
    ];

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fetch => "Fetch",
            Self::Decode => "Decode",
            Self::Execute => "Execute",
            Self::Memory => "Memory",
            Self::Writeback => "Writeback",
        }
    }
}

/// Complete observable state of the core after a cycle.
#[derive(Clone, Debug, Default)]
pub struct CoreState {
    /// Per-stage view of the instruction processed this cycle.
    pub internal: [StageSnapshot; 5],
    /// IF/ID latch.
    pub if_id: IfIdEntry,
    /// ID/EX latch.
    pub id_ex: IdExEntry,
    /// EX/MEM latch.
    pub ex_mem: ExMemEntry,
    /// MEM/WB latch.
    pub mem_wb: MemWbEntry,

    /// Cycles executed since reset.
    pub cycle_count: u64,
    /// Cycles decode was stalled by a hazard.
    pub stall_count: u64,
    /// Run status.
    pub status: CoreStatus,
    /// Most recently committed exception.
    pub last_exception: ExceptionCause,
    /// Decode stalled this cycle.
    pub stalled: bool,
    /// Instructions squashed this cycle.
    pub flushed: u32,

    /// General-purpose register written this cycle.
    pub reg_write: Option<(u8, RegisterValue)>,
    /// HI value written this cycle.
    pub hi_write: Option<RegisterValue>,
    /// LO value written this cycle.
    pub lo_write: Option<RegisterValue>,
    /// Data access performed this cycle.
    pub mem_access: Option<MemAccessRecord>,
}

impl CoreState {
    /// Per-stage view of `stage`.
    pub const fn stage(&self, stage: Stage) -> &StageSnapshot {
        &self.internal[stage as usize]
    }

    pub(crate) fn set_stage(&mut self, stage: Stage, snapshot: StageSnapshot) {
        self.internal[stage as usize] = snapshot;
    }

    /// Clears the per-cycle records before a new cycle.
    pub(crate) fn begin_cycle(&mut self) {
        self.internal = [StageSnapshot::default(); 5];
        self.stalled = false;
        self.flushed = 0;
        self.reg_write = None;
        self.hi_write = None;
        self.lo_write = None;
        self.mem_access = None;
    }

    /// Returns `true` while the core is running.
    pub const fn is_running(&self) -> bool {
        matches!(self.status, CoreStatus::Running)
    }
}
