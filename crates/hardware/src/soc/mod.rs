//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components that make up the simulated board:
//! the physical address space router, RAM, memory-mapped peripherals, the
//! interrupt controller, and the builder that assembles them.

/// System builder for assembling SoC components.
pub mod builder;

/// Memory-mapped device implementations.
pub mod devices;

/// Physical address space router.
pub mod interconnect;

/// Shared pending-interrupt bitmap.
pub mod interrupt;

/// Sparse RAM backend.
pub mod memory;

/// Memory access trait definitions.
pub mod traits;

pub use builder::System;
pub use interconnect::PhysAddrSpace;
pub use interrupt::InterruptController;
pub use traits::MemoryAccess;
