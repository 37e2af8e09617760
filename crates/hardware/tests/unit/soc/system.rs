//! Board assembly tests.

use crate::common::harness::TestContext;
use mipsim_core::common::Address;
use mipsim_core::common::constants::{SERIAL_PORT_BASE, SPI_LED_BASE};
use mipsim_core::config::MachineConfig;
use mipsim_core::soc::System;
use mipsim_core::soc::devices::{Backend, BufferedSerial};
use mipsim_core::soc::traits::LocationStatus;
use mipsim_core::soc::MemoryAccess;

#[test]
fn default_map_has_ram_and_both_peripherals() {
    let mut system = System::new(&MachineConfig::default(), Box::new(BufferedSerial::new())).unwrap();
    let ranges: Vec<(u64, u64)> = system
        .bus
        .ranges()
        .map(|(_, start, last)| (start.val(), last.val()))
        .collect();
    assert_eq!(
        ranges,
        vec![
            (0x0, 0xefff_ffff),
            (SERIAL_PORT_BASE, SERIAL_PORT_BASE + 0x1f),
            (SPI_LED_BASE, SPI_LED_BASE + 0xff),
        ]
    );
    assert_eq!(system.bus.location_status(Address::new(0xf000_0000)), LocationStatus::Illegal);
    assert_eq!(system.bus.read_word(Address::new(0xffff_0000), false), 0);
}

#[test]
fn peripheral_windows_must_not_overlap() {
    let config = MachineConfig {
        spi_led_base: 0xffff_c010,
        ..MachineConfig::default()
    };
    assert!(System::new(&config, Box::new(BufferedSerial::new())).is_err());
}

#[test]
fn program_drives_leds_and_reads_knobs() {
    let mut ctx = TestContext::new().load_asm(&[
        "addiu $2, $0, 0x5a",
        // Negative offsets from $0 sign-extend into the peripheral window.
        "sw $2, -0x3efc($0)",
        "lw $3, -0x3edc($0)",
        "break",
    ]);
    let _ = ctx.sim.with_spi_led(|led| led.green_knob_update(0x33));
    let _ = ctx.run_to_stop();
    assert_eq!(ctx.sim.with_spi_led(|led| led.led_line()), Some(0x5a));
    assert_eq!(ctx.get_reg(3), 0x3300);
}

#[test]
fn host_handles_share_state_with_the_bus() {
    let ctx = TestContext::new();
    let guard = ctx.sim.serial_port().lock().unwrap();
    assert!(matches!(&*guard, Backend::SerialPort(_)));
}
