//! Memory-Mapped Backends.
//!
//! This module contains the backends the address router dispatches to: RAM, the
//! serial port and the LED/knob controller. The set is closed, so dispatch goes
//! through the [`Backend`] sum type rather than trait objects.

/// Serial port with host-side byte source and sink.
pub mod serial_port;

/// LED line, RGB LEDs and knobs.
pub mod spi_led;

use std::sync::{Arc, Mutex};

pub use serial_port::{BufferedSerial, SerialHost, SerialPort, StdoutSerial};
pub use spi_led::SpiLed;

use crate::common::Address;
use crate::soc::memory::Memory;
use crate::soc::traits::{ExternalChange, LocationStatus, MemoryAccess};

/// A backend that can be mapped into the physical address space.
#[derive(Debug)]
pub enum Backend {
    /// Sparse RAM.
    Memory(Memory),
    /// Serial port.
    SerialPort(SerialPort),
    /// LED/knob controller.
    SpiLed(SpiLed),
}

/// Host-held handle to a backend mapped as borrowed.
pub type SharedBackend = Arc<Mutex<Backend>>;

impl Backend {
    /// Short name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::SerialPort(_) => "serial-port",
            Self::SpiLed(_) => "spi-led",
        }
    }

    /// Drains changes the backend made outside core-initiated writes.
    pub fn take_external_changes(&mut self) -> Vec<ExternalChange> {
        match self {
            Self::Memory(_) => Vec::new(),
            Self::SerialPort(dev) => dev.take_external_changes(),
            Self::SpiLed(dev) => dev.take_external_changes(),
        }
    }

    /// Wraps the backend in a shared handle.
    pub fn shared(self) -> SharedBackend {
        Arc::new(Mutex::new(self))
    }
}

impl MemoryAccess for Backend {
    fn read_word(&mut self, addr: Address, debug: bool) -> u32 {
        match self {
            Self::Memory(dev) => dev.read_word(addr, debug),
            Self::SerialPort(dev) => dev.read_word(addr, debug),
            Self::SpiLed(dev) => dev.read_word(addr, debug),
        }
    }

    fn write_word(&mut self, addr: Address, value: u32) -> bool {
        match self {
            Self::Memory(dev) => dev.write_word(addr, value),
            Self::SerialPort(dev) => dev.write_word(addr, value),
            Self::SpiLed(dev) => dev.write_word(addr, value),
        }
    }

    fn location_status(&self, addr: Address) -> LocationStatus {
        match self {
            Self::Memory(dev) => dev.location_status(addr),
            Self::SerialPort(dev) => dev.location_status(addr),
            Self::SpiLed(dev) => dev.location_status(addr),
        }
    }
}

impl From<Memory> for Backend {
    fn from(dev: Memory) -> Self {
        Self::Memory(dev)
    }
}

impl From<SerialPort> for Backend {
    fn from(dev: SerialPort) -> Self {
        Self::SerialPort(dev)
    }
}

impl From<SpiLed> for Backend {
    fn from(dev: SpiLed) -> Self {
        Self::SpiLed(dev)
    }
}
