//! Execution units and functional components.
//!
//! This module contains the arithmetic unit, the set-associative caches with
//! their replacement policies, and the load/store unit's sub-word handling.

/// Arithmetic Logic Unit for integer, multiply and divide operations.
pub mod alu;

/// Set-associative caches with replacement and write policies.
pub mod cache;

/// Load/Store Unit for sub-word and unaligned memory accesses.
pub mod lsu;
