//! LED and knob controller.
//!
//! Models a board peripheral with an LED line, two RGB LEDs and three rotary
//! knobs with push buttons. LED registers are written by the program; knob
//! registers are read-only from the bus and updated by the host through the
//! `*_knob_update` and `*_knob_push` methods.

use tracing::{debug, warn};

use crate::common::Address;
use crate::soc::traits::{ExternalChange, LocationStatus, MemoryAccess};

/// 32-bit LED line.
pub const REG_LED_LINE: u64 = 0x004;
/// First RGB LED (`0x00RRGGBB`).
pub const REG_LED_RGB1: u64 = 0x010;
/// Second RGB LED (`0x00RRGGBB`).
pub const REG_LED_RGB2: u64 = 0x014;
/// Direct keyboard write register.
pub const REG_LED_KBDWR_DIRECT: u64 = 0x018;
/// Direct keyboard / knob read register.
pub const REG_KBDRD_KNOBS_DIRECT: u64 = 0x020;
/// Knob positions (8 bits each) and push states.
pub const REG_KNOBS_8BIT: u64 = 0x024;

/// LED/knob controller state.
#[derive(Clone, Debug, Default)]
pub struct SpiLed {
    led_line: u32,
    led_rgb1: u32,
    led_rgb2: u32,
    led_kbdwr_direct: u32,
    kbdrd_knobs_direct: u32,
    knobs_8bit: u32,
    change_counter: u64,
    changes: Vec<ExternalChange>,
}

impl SpiLed {
    /// Creates a controller with every register cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current LED line value.
    pub const fn led_line(&self) -> u32 {
        self.led_line
    }

    /// Current first RGB LED value.
    pub const fn led_rgb1(&self) -> u32 {
        self.led_rgb1
    }

    /// Current second RGB LED value.
    pub const fn led_rgb2(&self) -> u32 {
        self.led_rgb2
    }

    /// Current knob register value.
    pub const fn knobs(&self) -> u32 {
        self.knobs_8bit
    }

    /// Number of visible state changes so far.
    pub const fn change_counter(&self) -> u64 {
        self.change_counter
    }

    /// Sets the red knob position.
    pub fn red_knob_update(&mut self, value: u8) {
        self.knob_update(u32::from(value), 0xff, 16);
    }

    /// Sets the green knob position.
    pub fn green_knob_update(&mut self, value: u8) {
        self.knob_update(u32::from(value), 0xff, 8);
    }

    /// Sets the blue knob position.
    pub fn blue_knob_update(&mut self, value: u8) {
        self.knob_update(u32::from(value), 0xff, 0);
    }

    /// Sets the red knob push state.
    pub fn red_knob_push(&mut self, pressed: bool) {
        self.knob_update(u32::from(pressed), 1, 26);
    }

    /// Sets the green knob push state.
    pub fn green_knob_push(&mut self, pressed: bool) {
        self.knob_update(u32::from(pressed), 1, 25);
    }

    /// Sets the blue knob push state.
    pub fn blue_knob_push(&mut self, pressed: bool) {
        self.knob_update(u32::from(pressed), 1, 24);
    }

    /// Drains changes made outside core-initiated writes.
    pub fn take_external_changes(&mut self) -> Vec<ExternalChange> {
        std::mem::take(&mut self.changes)
    }

    /// Replaces the masked bit-field of the knob register.
    ///
    /// Nothing is recorded when the field already holds `value`.
    fn knob_update(&mut self, value: u32, mask: u32, shift: u32) {
        let mask = mask << shift;
        let value = (value << shift) & mask;
        if (self.knobs_8bit ^ value) & mask == 0 {
            return;
        }
        self.knobs_8bit = (self.knobs_8bit & !mask) | value;
        self.change_counter += 1;
        self.changes.push(ExternalChange {
            start: REG_KNOBS_8BIT,
            last: REG_KNOBS_8BIT + 3,
        });
    }

    fn read_reg(&self, offset: u64) -> u32 {
        debug_assert!(offset & 3 == 0, "misaligned LED controller register");
        match offset {
            REG_LED_LINE => self.led_line,
            REG_LED_RGB1 => self.led_rgb1,
            REG_LED_RGB2 => self.led_rgb2,
            REG_LED_KBDWR_DIRECT => self.led_kbdwr_direct,
            REG_KBDRD_KNOBS_DIRECT => self.kbdrd_knobs_direct,
            REG_KNOBS_8BIT => self.knobs_8bit,
            _ => 0,
        }
    }

    fn write_reg(&mut self, offset: u64, value: u32) -> bool {
        debug_assert!(offset & 3 == 0, "misaligned LED controller register");
        let slot = match offset {
            REG_LED_LINE => &mut self.led_line,
            REG_LED_RGB1 => &mut self.led_rgb1,
            REG_LED_RGB2 => &mut self.led_rgb2,
            REG_LED_KBDWR_DIRECT => &mut self.led_kbdwr_direct,
            REG_KBDRD_KNOBS_DIRECT | REG_KNOBS_8BIT => return false,
            _ => {
                warn!(offset, value, "write to unknown LED controller register");
                return false;
            }
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        debug!(offset, value, "LED register changed");
        self.change_counter += 1;
        true
    }
}

impl MemoryAccess for SpiLed {
    fn read_word(&mut self, addr: Address, _debug: bool) -> u32 {
        self.read_reg(addr.val() & !3)
    }

    fn write_word(&mut self, addr: Address, value: u32) -> bool {
        self.write_reg(addr.val() & !3, value)
    }

    fn location_status(&self, addr: Address) -> LocationStatus {
        match addr.val() & !3 {
            REG_LED_LINE | REG_LED_RGB1 | REG_LED_RGB2 | REG_LED_KBDWR_DIRECT => {
                LocationStatus::None
            }
            REG_KBDRD_KNOBS_DIRECT | REG_KNOBS_8BIT => LocationStatus::ReadOnly,
            _ => LocationStatus::Illegal,
        }
    }
}
