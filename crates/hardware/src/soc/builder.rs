//! System-on-Chip construction and top-level `System` type.
//!
//! This module builds the simulated board from configuration. It performs:
//! 1. **Address map setup:** Creates the physical address space router.
//! 2. **Device registration:** Maps RAM (owned by the router) plus the serial port and the
//!    LED/knob controller (shared with the host so it can inspect and drive them).
//! 3. **Interrupt wiring:** Connects the serial port's lines to one `InterruptController`.

use tracing::info;

use crate::common::constants::{RAM_LAST, RAM_START, SERIAL_PORT_SIZE, SPI_LED_SIZE};
use crate::common::{Address, SimError};
use crate::config::MachineConfig;
use crate::soc::devices::{Backend, SerialHost, SerialPort, SharedBackend, SpiLed};
use crate::soc::interconnect::PhysAddrSpace;
use crate::soc::interrupt::InterruptController;
use crate::soc::memory::Memory;

/// Top-level board: the address space plus host handles to its peripherals.
#[derive(Debug)]
pub struct System {
    /// Physical address space router.
    pub bus: PhysAddrSpace,
    /// Pending-interrupt bitmap shared with the peripherals.
    pub interrupts: InterruptController,
    /// Host handle to the serial port.
    pub serial_port: SharedBackend,
    /// Host handle to the LED/knob controller.
    pub spi_led: SharedBackend,
}

impl System {
    /// Builds the board described by `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Machine configuration (peripheral base addresses).
    /// * `serial_host` - Byte source and sink for the serial port.
    ///
    /// # Returns
    ///
    /// The assembled system, or an error if a peripheral window overlaps another mapping.
    pub fn new(config: &MachineConfig, serial_host: Box<dyn SerialHost>) -> Result<Self, SimError> {
        let mut bus = PhysAddrSpace::new();
        let interrupts = InterruptController::new();

        let _ = bus.insert_owned(Memory::new(), Address::new(RAM_START), Address::new(RAM_LAST))?;

        let serial_port =
            Backend::from(SerialPort::new(serial_host, interrupts.clone())).shared();
        let base = Address::new(config.serial_port_base);
        let _ = bus.insert_shared(&serial_port, base, base + (SERIAL_PORT_SIZE - 1))?;

        let spi_led = Backend::from(SpiLed::new()).shared();
        let base = Address::new(config.spi_led_base);
        let _ = bus.insert_shared(&spi_led, base, base + (SPI_LED_SIZE - 1))?;

        info!(ranges = bus.range_count(), "system assembled");
        Ok(Self {
            bus,
            interrupts,
            serial_port,
            spi_led,
        })
    }
}
