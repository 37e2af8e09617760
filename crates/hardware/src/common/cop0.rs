//! System control coprocessor (coprocessor 0).
//!
//! This module holds the privileged state that lets a program handle its own
//! exceptions and interrupts. It provides:
//! 1. **Registers:** Status, Cause, EPC, Count/Compare, EBase and friends, addressed by
//!    `(rd, sel)` with per-register write masks.
//! 2. **Interrupts:** Hardware lines mirrored into `Cause.IP`, plus the Count/Compare timer.
//! 3. **Exception Entry and Return:** EPC/Cause/EXL updates at the commit point and `ERET`.
//!
//! With `Status.IE` clear (the reset value) nothing is vectored and exceptions follow the
//! configured stop and step-over policy.

use serde::Serialize;

use super::addr::Address;

/// Interrupts enabled.
pub const STATUS_IE: u32 = 0x0000_0001;
/// Exception level: set while a handler runs, masks further vectoring.
pub const STATUS_EXL: u32 = 0x0000_0002;
/// Error level.
pub const STATUS_ERL: u32 = 0x0000_0004;
/// Interrupt mask, one bit per line (IM0-IM7).
pub const STATUS_IM: u32 = 0x0000_ff00;

/// Exception raised in a branch delay slot.
pub const CAUSE_BD: u32 = 0x8000_0000;
/// Pending interrupt lines (IP0-IP7).
pub const CAUSE_IP: u32 = 0x0000_ff00;
/// Exception code field.
pub const CAUSE_EXC_CODE: u32 = 0x0000_007c;

/// Exception code of an address error on a store.
pub const EXC_CODE_ADDRESS_STORE: u32 = 5;

/// Offset of the general exception vector from EBase.
pub const VECTOR_OFFSET: u32 = 0x180;

/// Interrupt line driven by the Count/Compare timer.
pub const TIMER_IRQ_LEVEL: u8 = 7;

/// Coprocessor 0 registers the simulator implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Cop0Register {
    /// Thread pointer readable from user mode (4, 2).
    UserLocal,
    /// Address of the most recent address error (8, 0).
    BadVAddr,
    /// Cycle counter (9, 0).
    Count,
    /// Timer interrupt threshold (11, 0).
    Compare,
    /// Processor status and control (12, 0).
    Status,
    /// Cause of the last exception and pending interrupts (13, 0).
    Cause,
    /// Program counter at the last exception (14, 0).
    Epc,
    /// Exception vector base (15, 1).
    EBase,
    /// Configuration (16, 0).
    Config,
}

impl Cop0Register {
    /// Number of implemented registers.
    pub const COUNT: usize = 9;

    /// Every register in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::UserLocal,
        Self::BadVAddr,
        Self::Count,
        Self::Compare,
        Self::Status,
        Self::Cause,
        Self::Epc,
        Self::EBase,
        Self::Config,
    ];

    /// Looks a register up by its `(rd, sel)` address.
    pub const fn from_index(rd: u8, sel: u8) -> Option<Self> {
        Some(match (rd, sel) {
            (4, 2) => Self::UserLocal,
            (8, 0) => Self::BadVAddr,
            (9, 0) => Self::Count,
            (11, 0) => Self::Compare,
            (12, 0) => Self::Status,
            (13, 0) => Self::Cause,
            (14, 0) => Self::Epc,
            (15, 1) => Self::EBase,
            (16, 0) => Self::Config,
            _ => return None,
        })
    }

    /// The `(rd, sel)` address.
    pub const fn index(self) -> (u8, u8) {
        match self {
            Self::UserLocal => (4, 2),
            Self::BadVAddr => (8, 0),
            Self::Count => (9, 0),
            Self::Compare => (11, 0),
            Self::Status => (12, 0),
            Self::Cause => (13, 0),
            Self::Epc => (14, 0),
            Self::EBase => (15, 1),
            Self::Config => (16, 0),
        }
    }

    /// Display name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::UserLocal => "UserLocal",
            Self::BadVAddr => "BadVAddr",
            Self::Count => "Count",
            Self::Compare => "Compare",
            Self::Status => "Status",
            Self::Cause => "Cause",
            Self::Epc => "EPC",
            Self::EBase => "EBase",
            Self::Config => "Config",
        }
    }

    /// Bits an `MTC0` may change.
    pub const fn write_mask(self) -> u32 {
        match self {
            Self::UserLocal | Self::Count | Self::Compare | Self::Epc => 0xffff_ffff,
            Self::Status => STATUS_IE | STATUS_IM,
            Self::EBase => 0xffff_fffc,
            Self::BadVAddr | Self::Cause | Self::Config => 0,
        }
    }

    /// Value after reset.
    pub const fn reset_value(self) -> u32 {
        match self {
            Self::EBase => 0x8000_0000,
            _ => 0,
        }
    }
}

/// Coprocessor 0 register state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cop0State {
    regs: [u32; Cop0Register::COUNT],
    timer_irq: bool,
}

impl Default for Cop0State {
    fn default() -> Self {
        Self::new()
    }
}

impl Cop0State {
    /// Creates the reset state.
    pub fn new() -> Self {
        let mut regs = [0; Cop0Register::COUNT];
        for reg in Cop0Register::ALL {
            regs[reg as usize] = reg.reset_value();
        }
        Self {
            regs,
            timer_irq: false,
        }
    }

    /// Returns every register to its reset value.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Reads a register.
    pub const fn get(&self, reg: Cop0Register) -> u32 {
        self.regs[reg as usize]
    }

    /// Writes a register through its `MTC0` write mask.
    ///
    /// Writing Count or Compare acknowledges the timer interrupt.
    pub fn set(&mut self, reg: Cop0Register, value: u32) {
        if matches!(reg, Cop0Register::Count | Cop0Register::Compare) {
            self.timer_irq = false;
            self.regs[Cop0Register::Cause as usize] &= !(1 << (8 + TIMER_IRQ_LEVEL));
        }
        let mask = reg.write_mask();
        let old = self.regs[reg as usize];
        self.regs[reg as usize] = (value & mask) | (old & !mask);
    }

    /// `MFC0`: reads the register at `(rd, sel)`, or `None` if it is not implemented.
    pub fn read(&self, rd: u8, sel: u8) -> Option<u32> {
        Cop0Register::from_index(rd, sel).map(|reg| self.get(reg))
    }

    /// `MTC0`: writes the register at `(rd, sel)`.
    ///
    /// # Returns
    ///
    /// `false` if the register is not implemented.
    pub fn write(&mut self, rd: u8, sel: u8, value: u32) -> bool {
        match Cop0Register::from_index(rd, sel) {
            Some(reg) => {
                self.set(reg, value);
                true
            }
            None => false,
        }
    }

    /// Current Status register.
    pub const fn status(&self) -> u32 {
        self.get(Cop0Register::Status)
    }

    /// Current Cause register.
    pub const fn cause(&self) -> u32 {
        self.get(Cop0Register::Cause)
    }

    /// Current EPC register.
    pub const fn epc(&self) -> u32 {
        self.get(Cop0Register::Epc)
    }

    /// Returns `true` when committed exceptions are redirected to the handler:
    /// `Status.IE` set while neither EXL nor ERL is.
    pub const fn vectoring_enabled(&self) -> bool {
        let status = self.status();
        status & STATUS_IE != 0 && status & (STATUS_EXL | STATUS_ERL) == 0
    }

    /// Address of the general exception vector.
    pub const fn exception_vector(&self) -> Address {
        Address::new(self.get(Cop0Register::EBase).wrapping_add(VECTOR_OFFSET) as u64)
    }

    /// Advances Count by `cycles` and raises the timer line when it reaches Compare.
    pub fn advance(&mut self, cycles: u32) {
        let before = self.get(Cop0Register::Count);
        let after = before.wrapping_add(cycles);
        self.regs[Cop0Register::Count as usize] = after;
        let compare = self.get(Cop0Register::Compare);
        if compare.wrapping_sub(before) as i32 > 0 && compare.wrapping_sub(after) as i32 <= 0 {
            self.timer_irq = true;
        }
    }

    /// Mirrors the hardware interrupt lines 0-7 into `Cause.IP`.
    ///
    /// The timer drives line 7 in addition to any device on that level.
    pub fn sync_interrupt_lines(&mut self, pending: u32) {
        let mut ip = (pending & 0xff) << 8;
        if self.timer_irq {
            ip |= 1 << (8 + TIMER_IRQ_LEVEL);
        }
        let cause = &mut self.regs[Cop0Register::Cause as usize];
        *cause = (*cause & !CAUSE_IP) | ip;
    }

    /// Returns `true` when an enabled interrupt line is pending and vectoring is enabled.
    pub const fn interrupt_request(&self) -> bool {
        self.vectoring_enabled() && self.status() & self.cause() & STATUS_IM != 0
    }

    /// Enters the exception handler.
    ///
    /// Records the cause, the restart address and the delay-slot flag, sets EXL, and
    /// returns the vector to fetch from.
    ///
    /// # Arguments
    ///
    /// * `exc_code` - Architectural exception code.
    /// * `pc` - Address of the faulting instruction.
    /// * `in_delay_slot` - The instruction sits in a branch delay slot; EPC then points
    ///   at the branch.
    /// * `bad_vaddr` - Faulting data or jump address for address errors.
    pub fn enter_exception(
        &mut self,
        exc_code: u32,
        pc: Address,
        in_delay_slot: bool,
        bad_vaddr: Option<Address>,
    ) -> Address {
        let epc = if in_delay_slot {
            pc.as_u32().wrapping_sub(4)
        } else {
            pc.as_u32()
        };
        self.regs[Cop0Register::Epc as usize] = epc;

        let cause = &mut self.regs[Cop0Register::Cause as usize];
        *cause &= !(CAUSE_BD | CAUSE_EXC_CODE);
        *cause |= (exc_code << 2) & CAUSE_EXC_CODE;
        if in_delay_slot {
            *cause |= CAUSE_BD;
        }
        if let Some(addr) = bad_vaddr {
            self.regs[Cop0Register::BadVAddr as usize] = addr.as_u32();
        }
        self.regs[Cop0Register::Status as usize] |= STATUS_EXL;
        self.exception_vector()
    }

    /// `ERET`: leaves the handler.
    ///
    /// # Returns
    ///
    /// The address to resume at (EPC).
    pub fn eret(&mut self) -> Address {
        self.regs[Cop0Register::Status as usize] &= !STATUS_EXL;
        Address::from(self.epc())
    }
}
