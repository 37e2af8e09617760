//! Interrupt controller.
//!
//! Peripherals raise and lower numbered interrupt lines; the core samples the
//! pending bitmap at its commit point. The controller is a cheap shared handle so
//! devices and the core can each hold a copy.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Shared pending-interrupt bitmap (one bit per IRQ level, 0-31).
#[derive(Clone, Debug, Default)]
pub struct InterruptController {
    pending: Arc<AtomicU32>,
}

impl InterruptController {
    /// Creates a controller with no pending interrupts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Asserts the line at `level`.
    pub fn raise(&self, level: u8) {
        let _ = self.pending.fetch_or(1 << (level & 31), Ordering::SeqCst);
    }

    /// Deasserts the line at `level`.
    pub fn lower(&self, level: u8) {
        let _ = self.pending.fetch_and(!(1 << (level & 31)), Ordering::SeqCst);
    }

    /// Sets the line at `level` to `active`.
    pub fn set(&self, level: u8, active: bool) {
        if active {
            self.raise(level);
        } else {
            self.lower(level);
        }
    }

    /// Current pending bitmap.
    pub fn pending(&self) -> u32 {
        self.pending.load(Ordering::SeqCst)
    }

    /// Returns `true` if the line at `level` is asserted.
    pub fn is_pending(&self, level: u8) -> bool {
        self.pending() & (1 << (level & 31)) != 0
    }

    /// Clears every line.
    pub fn clear(&self) {
        self.pending.store(0, Ordering::SeqCst);
    }
}
