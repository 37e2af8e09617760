//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which serves as the container for the
//! entire processor state. It coordinates the following:
//! 1. **State Management:** Maintains the register file, HI/LO, the program counter and
//!    coprocessor 0.
//! 2. **Pipeline Control:** Holds the latches and counters exposed through `CoreState`.
//! 3. **Memory Hierarchy:** Owns the program, data and level-2 caches in front of the bus.
//! 4. **System Integration:** Samples the interrupt controller at the commit point and
//!    vectors to the exception handler when coprocessor 0 enables it.

/// Cycle stepping for the single-cycle and pipelined cores.
pub mod execution;

/// Memory hierarchy and data access helpers.
pub mod memory;

use tracing::debug;

use crate::common::{Address, Cop0State, RegisterFile};
use crate::config::MachineConfig;
use crate::core::pipeline::latches::{IdExEntry, IfIdEntry};
use crate::core::pipeline::state::{CoreState, Stage};
use crate::soc::interconnect::PhysAddrSpace;
use crate::soc::interrupt::InterruptController;
use crate::stats::SimStats;

pub use memory::MemorySystem;

/// Main CPU structure containing all processor state and components.
#[derive(Debug)]
pub struct Cpu {
    /// General-purpose registers, HI/LO and PC.
    pub regs: RegisterFile,
    /// Coprocessor 0 (Status, Cause, EPC, timer).
    pub cop0: Cop0State,
    /// Caches and the physical address space.
    pub mem: MemorySystem,
    /// Pending interrupt lines.
    pub interrupts: InterruptController,
    /// Configuration the core was built from.
    pub config: MachineConfig,
    /// Latches, per-stage views, counters and status.
    pub state: CoreState,
    /// Performance statistics.
    pub stats: SimStats,
    /// Branch target waiting for its delay slot to execute (single-cycle core).
    pending_branch: Option<Address>,
    /// Handler entry or `ERET` target decided at the commit point this cycle.
    pub(crate) trap_redirect: Option<Address>,
    /// The last committed instruction was a branch or jump, so the next one sits in
    /// its delay slot.
    pub(crate) after_control: bool,
}

impl Cpu {
    /// Creates a CPU in reset state.
    ///
    /// # Arguments
    ///
    /// * `bus` - The physical address space the caches sit in front of.
    /// * `interrupts` - Controller the peripherals raise their lines on.
    /// * `config` - Machine configuration.
    pub fn new(bus: PhysAddrSpace, interrupts: InterruptController, config: &MachineConfig) -> Self {
        Self {
            regs: RegisterFile::new(Address::new(config.reset_pc)),
            cop0: Cop0State::new(),
            mem: MemorySystem::new(bus, config),
            interrupts,
            config: config.clone(),
            state: CoreState::default(),
            stats: SimStats::default(),
            pending_branch: None,
            trap_redirect: None,
            after_control: false,
        }
    }

    /// Returns the core to its reset state.
    ///
    /// Registers, latches, counters and cache contents are cleared. Memory keeps its
    /// content; dirty cache lines are written back first.
    pub fn reset(&mut self) {
        self.mem.flush_caches();
        self.mem.reset_caches();
        self.regs.reset(Address::new(self.config.reset_pc));
        self.cop0.reset();
        self.state = CoreState::default();
        self.stats = SimStats::default();
        self.pending_branch = None;
        self.trap_redirect = None;
        self.after_control = false;
    }

    /// Current program counter (next fetch address).
    pub const fn pc(&self) -> Address {
        self.regs.read_pc()
    }

    /// Returns `true` when an interrupt should replace the instruction at the commit point.
    ///
    /// Either a line selected by the configured `interrupt_mask` is pending, or coprocessor 0
    /// has interrupts enabled and a line unmasked in `Status.IM` is pending.
    pub fn interrupt_pending(&mut self) -> bool {
        let pending = self.interrupts.pending();
        self.cop0.sync_interrupt_lines(pending);
        pending & self.config.interrupt_mask != 0 || self.cop0.interrupt_request()
    }

    /// Redirects fetch to `target` and squashes every younger instruction.
    ///
    /// Used for exception entry and `ERET`, which have no delay slot.
    pub(crate) fn flush_to(&mut self, target: Address) {
        debug!(%target, "pipeline flushed");
        self.regs.write_pc(target);
        self.pending_branch = None;
        self.squash_id_ex();
        self.squash_if_id();
    }

    /// Redirects fetch to `target` and squashes wrong-path instructions.
    ///
    /// Younger instructions are the IF/ID entry, plus the ID/EX entry when resolving
    /// in memory. With delay slots the oldest of them survives.
    pub(crate) fn redirect(&mut self, target: Address, from: Stage) {
        debug!(%target, stage = from.name(), "branch taken");
        self.stats.branches_taken += 1;
        self.regs.write_pc(target);

        let mut spare = self.config.delay_slot;
        if from == Stage::Memory {
            if self.state.id_ex.valid && spare {
                spare = false;
            } else {
                self.squash_id_ex();
            }
        }
        if self.state.if_id.valid && spare {
            return;
        }
        self.squash_if_id();
    }

    fn squash_if_id(&mut self) {
        if self.state.if_id.valid {
            self.state.flushed += 1;
            self.stats.flushes += 1;
        }
        self.state.if_id = IfIdEntry::default();
    }

    fn squash_id_ex(&mut self) {
        if self.state.id_ex.valid {
            self.state.flushed += 1;
            self.stats.flushes += 1;
        }
        self.state.id_ex = IdExEntry::default();
    }
}
