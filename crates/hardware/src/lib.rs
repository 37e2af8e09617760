//! MIPS32 teaching simulator library.
//!
//! This crate implements a cycle-accurate MIPS32 integer simulator with the following:
//! 1. **Core:** Single-cycle and five-stage pipelined cores with configurable hazard
//!    handling, delay slots and branch resolution stage.
//! 2. **Memory:** Set-associative program, data and level-2 caches with RANDOM/LRU/LFU
//!    replacement and write-back or write-through policies.
//! 3. **ISA:** Decoding, encoding and disassembly of the MIPS32 integer subset.
//! 4. **SoC:** Physical address space router, RAM, serial port and LED/knob peripherals.
//! 5. **Simulation:** Stepping, observers, tracing, reporting and statistics.

/// Common types and constants (addresses, registers, exception causes, errors).
pub mod common;
/// Simulator configuration (machine, caches, timing, exception policy).
pub mod config;
/// CPU core (pipeline, execution units, caches, cycle loop).
pub mod core;
/// Address to source-line lookup table.
pub mod debuginfo;
/// Instruction set (decode, encode, disassembly, ABI names).
pub mod isa;
/// Simulator host layer (stepping, trace, report).
pub mod sim;
/// System-on-chip (builder, address router, devices, memory, traits).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Machine configuration; use `MachineConfig::default()` or load it from JSON.
pub use crate::config::MachineConfig;
/// Main CPU type; holds registers, pipeline state, caches and stats.
pub use crate::core::Cpu;
/// Observable per-cycle core state.
pub use crate::core::pipeline::state::{CoreState, CoreStatus};
/// Source-line table for loaded programs.
pub use crate::debuginfo::DebugInfo;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::{Simulator, StepOutcome};
/// Top-level system (bus, interrupts, peripherals); construct with `System::new`.
pub use crate::soc::System;
