//! Core processor implementation.
//!
//! This module contains the main CPU implementation including the instruction
//! pipeline, the execution units and the cycle loop that coordinates them.

/// CPU core implementation and execution orchestration.
pub mod cpu;

/// Instruction pipeline implementation (stages, latches, hazards, signals, state).
pub mod pipeline;

/// Execution units (ALU, caches, load/store unit).
pub mod units;

pub use self::cpu::Cpu;
