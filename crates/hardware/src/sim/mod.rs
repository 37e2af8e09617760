//! Simulation host layer.
//!
//! Provides the simulator hosts drive, the program loader, the per-cycle tracer
//! and the end-of-run reporter built on its public state.

/// ELF and raw program images.
pub mod loader;

/// End-of-run register, cache and cycle report.
pub mod report;

/// Simulator construction, stepping and observers.
pub mod simulator;

/// Per-cycle textual trace.
pub mod trace;

pub use loader::{ProgramImage, Segment};
pub use report::{DumpRange, ReportOptions, Reporter};
pub use simulator::{Simulator, StepOutcome};
pub use trace::{TraceOptions, Tracer};
