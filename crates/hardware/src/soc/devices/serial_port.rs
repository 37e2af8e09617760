//! Serial port.
//!
//! A minimal memory-mapped serial line with four word registers:
//! receive status, receive data, transmit status and transmit data.
//! Received bytes are pulled from a host-side [`SerialHost`] whenever a read
//! touches the receiver while it is not ready; transmitted bytes are pushed to the
//! host immediately. Two interrupt lines follow `IE && READY` for each direction.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{trace, warn};

use crate::common::Address;
use crate::common::constants::{IRQ_SERIAL_RX, IRQ_SERIAL_TX};
use crate::soc::interrupt::InterruptController;
use crate::soc::traits::{ExternalChange, LocationStatus, MemoryAccess};

/// Receiver status register.
pub const REG_RX_ST: u64 = 0x00;
/// Receiver data register.
pub const REG_RX_DATA: u64 = 0x04;
/// Transmitter status register.
pub const REG_TX_ST: u64 = 0x08;
/// Transmitter data register (write-only).
pub const REG_TX_DATA: u64 = 0x0c;

/// Status register: data ready / transmitter ready.
pub const ST_READY: u32 = 0x1;
/// Status register: interrupt enable.
pub const ST_IE: u32 = 0x2;

/// Host side of the serial line.
pub trait SerialHost: Send {
    /// Returns the next received byte, if one is available.
    fn poll_rx(&mut self) -> Option<u8>;
    /// Consumes one transmitted byte.
    fn tx(&mut self, byte: u8);
}

#[derive(Debug, Default)]
struct BufferedInner {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

/// In-memory serial host with shared input and output queues.
///
/// Clones share the same queues, so a test or the CLI can keep a handle after
/// moving one into the serial port.
#[derive(Clone, Debug, Default)]
pub struct BufferedSerial {
    inner: Arc<Mutex<BufferedInner>>,
}

impl BufferedSerial {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a host whose receive queue holds `input`.
    pub fn with_input(input: &[u8]) -> Self {
        let host = Self::new();
        host.push_input(input);
        host
    }

    /// Queues bytes for the simulated program to receive.
    pub fn push_input(&self, input: &[u8]) {
        self.lock().rx.extend(input.iter().copied());
    }

    /// Everything the simulated program has transmitted so far.
    pub fn output(&self) -> Vec<u8> {
        self.lock().tx.clone()
    }

    /// Drains the transmitted bytes.
    pub fn take_output(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().tx)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufferedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SerialHost for BufferedSerial {
    fn poll_rx(&mut self) -> Option<u8> {
        self.lock().rx.pop_front()
    }

    fn tx(&mut self, byte: u8) {
        self.lock().tx.push(byte);
    }
}

/// Serial host that writes transmitted bytes to a sink and never receives.
pub struct StdoutSerial {
    sink: Box<dyn Write + Send>,
}

impl std::fmt::Debug for StdoutSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StdoutSerial").finish_non_exhaustive()
    }
}

impl StdoutSerial {
    /// Creates a host writing to `sink`.
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self { sink }
    }

    /// Creates a host writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl SerialHost for StdoutSerial {
    fn poll_rx(&mut self) -> Option<u8> {
        None
    }

    fn tx(&mut self, byte: u8) {
        if self.sink.write_all(&[byte]).is_err() {
            warn!("serial output sink rejected a byte");
        }
        if byte == b'\n' {
            let _ = self.sink.flush();
        }
    }
}

/// Serial port device state.
pub struct SerialPort {
    host: Box<dyn SerialHost>,
    irq: InterruptController,
    rx_st: u32,
    rx_data: u32,
    tx_st: u32,
    rx_irq_level: u8,
    tx_irq_level: u8,
    rx_irq_active: bool,
    tx_irq_active: bool,
    changes: Vec<ExternalChange>,
    change_counter: u64,
}

impl SerialPort {
    /// Creates a serial port.
    ///
    /// # Arguments
    ///
    /// * `host` - Source of received bytes and sink of transmitted bytes.
    /// * `irq` - Controller the interrupt lines are wired to.
    pub fn new(host: Box<dyn SerialHost>, irq: InterruptController) -> Self {
        Self {
            host,
            irq,
            rx_st: 0,
            rx_data: 0,
            tx_st: 0,
            rx_irq_level: IRQ_SERIAL_RX,
            tx_irq_level: IRQ_SERIAL_TX,
            rx_irq_active: false,
            tx_irq_active: false,
            changes: Vec::new(),
            change_counter: 0,
        }
    }

    /// IRQ level of the receiver line.
    pub const fn irq_level_rx(&self) -> u8 {
        self.rx_irq_level
    }

    /// IRQ level of the transmitter line.
    pub const fn irq_level_tx(&self) -> u8 {
        self.tx_irq_level
    }

    /// Returns `true` while the receiver holds an unread byte.
    pub const fn rx_ready(&self) -> bool {
        self.rx_st & ST_READY != 0
    }

    /// Receiver interrupt line state.
    pub const fn rx_irq_active(&self) -> bool {
        self.rx_irq_active
    }

    /// Transmitter interrupt line state.
    pub const fn tx_irq_active(&self) -> bool {
        self.tx_irq_active
    }

    /// Number of received-byte latches and register writes seen so far.
    pub const fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// Drains changes made outside core-initiated writes.
    pub fn take_external_changes(&mut self) -> Vec<ExternalChange> {
        std::mem::take(&mut self.changes)
    }

    /// Pulls one byte from the host if the receiver is empty.
    fn poll_rx_byte(&mut self) {
        if self.rx_ready() {
            return;
        }
        if let Some(byte) = self.host.poll_rx() {
            trace!(byte, "serial rx");
            self.rx_data = u32::from(byte);
            self.rx_st |= ST_READY;
            self.change_counter += 1;
            self.changes.push(ExternalChange {
                start: REG_RX_ST,
                last: REG_RX_DATA + 3,
            });
        }
        self.update_rx_irq();
    }

    fn update_rx_irq(&mut self) {
        let active = self.rx_st & ST_IE != 0 && self.rx_ready();
        if active != self.rx_irq_active {
            self.rx_irq_active = active;
            self.irq.set(self.rx_irq_level, active);
        }
    }

    fn update_tx_irq(&mut self) {
        // The transmitter is always ready.
        let active = self.tx_st & ST_IE != 0;
        if active != self.tx_irq_active {
            self.tx_irq_active = active;
            self.irq.set(self.tx_irq_level, active);
        }
    }

    /// Reads one register.
    fn read_reg(&mut self, offset: u64, debug: bool) -> u32 {
        debug_assert!(offset & 3 == 0, "misaligned serial port register");
        match offset {
            REG_RX_ST => {
                self.poll_rx_byte();
                self.rx_st
            }
            REG_RX_DATA => {
                self.poll_rx_byte();
                if !self.rx_ready() {
                    return 0;
                }
                let value = self.rx_data;
                if !debug {
                    self.rx_st &= !ST_READY;
                    self.poll_rx_byte();
                }
                value
            }
            REG_TX_ST => self.tx_st | ST_READY,
            REG_TX_DATA => 0,
            _ => {
                warn!(offset, "read of unknown serial port register");
                0
            }
        }
    }

    /// Writes one register.
    fn write_reg(&mut self, offset: u64, value: u32) -> bool {
        debug_assert!(offset & 3 == 0, "misaligned serial port register");
        match offset {
            REG_RX_ST => {
                self.rx_st = (self.rx_st & !ST_IE) | (value & ST_IE);
                self.update_rx_irq();
            }
            REG_TX_ST => {
                self.tx_st = (self.tx_st & !ST_IE) | (value & ST_IE);
                self.update_tx_irq();
            }
            REG_TX_DATA => self.host.tx((value & 0xFF) as u8),
            _ => {
                warn!(offset, value, "write to unknown serial port register");
                return false;
            }
        }
        self.change_counter += 1;
        true
    }
}

impl MemoryAccess for SerialPort {
    fn read_word(&mut self, addr: Address, debug: bool) -> u32 {
        self.read_reg(addr.val() & !3, debug)
    }

    fn write_word(&mut self, addr: Address, value: u32) -> bool {
        self.write_reg(addr.val() & !3, value)
    }

    fn location_status(&self, addr: Address) -> LocationStatus {
        match addr.val() & !3 {
            REG_RX_ST | REG_TX_ST | REG_TX_DATA => LocationStatus::None,
            REG_RX_DATA => LocationStatus::ReadOnly,
            _ => LocationStatus::Illegal,
        }
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("rx_st", &self.rx_st)
            .field("rx_data", &self.rx_data)
            .field("tx_st", &self.tx_st)
            .finish_non_exhaustive()
    }
}
