//! Global system constants.
//!
//! This module defines machine-wide constants used across the simulator. It includes:
//! 1. **Register Constants:** Register count and the ABI registers the core writes implicitly.
//! 2. **Memory Map:** Default placement of RAM and peripherals, and the uncached window.
//! 3. **Interrupt Lines:** IRQ levels raised by the built-in peripherals.

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 32;

/// Return-address register written by JAL, BLTZAL and BGEZAL.
pub const RA_REGISTER: u8 = 31;

/// Size of one instruction / data word in bytes.
pub const WORD_BYTES: u64 = 4;

/// First address of the RAM window.
pub const RAM_START: u64 = 0x0000_0000;

/// Last address of the RAM window.
pub const RAM_LAST: u64 = 0xefff_ffff;

/// First address of the always-uncached peripheral window.
pub const UNCACHED_START: u64 = 0xf000_0000;

/// Last address of the always-uncached peripheral window.
pub const UNCACHED_LAST: u64 = 0xffff_fffe;

/// Default base address of the serial port.
pub const SERIAL_PORT_BASE: u64 = 0xffff_c000;

/// Size of the serial port register window.
pub const SERIAL_PORT_SIZE: u64 = 0x20;

/// Default base address of the LED/knob controller.
pub const SPI_LED_BASE: u64 = 0xffff_c100;

/// Size of the LED/knob controller register window.
pub const SPI_LED_SIZE: u64 = 0x100;

/// IRQ level of the serial port transmitter.
pub const IRQ_SERIAL_TX: u8 = 2;

/// IRQ level of the serial port receiver.
pub const IRQ_SERIAL_RX: u8 = 3;

/// Default program counter after reset.
pub const DEFAULT_RESET_PC: u64 = 0x8002_0000;
