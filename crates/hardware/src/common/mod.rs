//! Common utilities and types used throughout the MIPS32 simulator.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Address Types:** A strong type for bus addresses.
//! 2. **Constants:** Register counts, the default memory map and IRQ levels.
//! 3. **Coprocessor 0:** Status, Cause, EPC and the exception entry/return rules.
//! 4. **Data:** Register values and memory access descriptors.
//! 5. **Error Handling:** Exception causes plus `thiserror` error enums.
//! 6. **Register Management:** The architectural register file.

/// Address type definition.
pub mod addr;

/// Common constants used throughout the simulator.
pub mod constants;

/// Coprocessor 0 state.
pub mod cop0;

/// Register values and memory access descriptors.
pub mod data;

/// Exception causes and error types.
pub mod error;

/// Register file implementation.
pub mod reg;

pub use addr::Address;
pub use cop0::{Cop0Register, Cop0State};
pub use data::{AccessControl, AccessType, RegisterValue};
pub use error::{
    AddressSpaceError, ConfigError, DecodeError, ExceptionCause, ParseError, SimError,
};
pub use reg::RegisterFile;
