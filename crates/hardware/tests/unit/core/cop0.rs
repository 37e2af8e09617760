//! Coprocessor 0 tests.
//!
//! Register masks and the Count/Compare timer are checked on `Cop0State`
//! directly; exception entry, `ERET` and interrupt handling run real programs
//! on both cores with a handler loaded at the general exception vector.

use crate::common::builder::ProgramBuilder;
use crate::common::harness::TestContext;
use mipsim_core::common::cop0::{CAUSE_BD, STATUS_EXL, STATUS_IE};
use mipsim_core::common::{Address, Cop0Register, Cop0State, ExceptionCause};
use mipsim_core::config::{ExceptionPolicy, MachineConfig};
use mipsim_core::StepOutcome;
use pretty_assertions::assert_eq;
use rstest::rstest;

/// EBase after reset plus the general vector offset.
const HANDLER: u64 = 0x8000_0180;

fn context(pipelined: bool, quiet: &[ExceptionCause]) -> TestContext {
    let mut exceptions = ExceptionPolicy::default();
    for &cause in quiet {
        exceptions.set_stop_on(cause, false);
    }
    TestContext::with_config(MachineConfig {
        pipelined,
        exceptions,
        ..MachineConfig::default()
    })
}

fn load_handler(ctx: &mut TestContext, lines: &[&str]) {
    let handler = ProgramBuilder::new(HANDLER).lines(lines);
    ctx.sim.load_image(Address::new(HANDLER), &handler.bytes());
}

fn exc_code(cause: u32) -> u32 {
    (cause >> 2) & 0x1f
}

// ══════════════════════════════════════════════════════════
// Register state
// ══════════════════════════════════════════════════════════

#[test]
fn writes_go_through_register_masks() {
    let mut cop0 = Cop0State::new();
    assert_eq!(cop0.read(15, 1), Some(0x8000_0000));

    cop0.set(Cop0Register::Status, 0xffff_ffff);
    assert_eq!(cop0.status(), 0xff01);
    cop0.set(Cop0Register::Cause, 0xffff_ffff);
    assert_eq!(cop0.cause(), 0);
    cop0.set(Cop0Register::EBase, 0x8010_0003);
    assert_eq!(cop0.exception_vector(), Address::new(0x8010_0180));

    assert!(cop0.write(4, 2, 0xdead_beef));
    assert_eq!(cop0.get(Cop0Register::UserLocal), 0xdead_beef);
    assert!(!cop0.write(1, 0, 1));
    assert_eq!(cop0.read(12, 1), None);
}

#[test]
fn delay_slot_exception_points_epc_at_the_branch() {
    let mut cop0 = Cop0State::new();
    cop0.set(Cop0Register::Status, STATUS_IE);
    assert!(cop0.vectoring_enabled());

    let vector = cop0.enter_exception(8, Address::new(0x8002_0104), true, None);
    assert_eq!(vector, Address::new(HANDLER));
    assert_eq!(cop0.epc(), 0x8002_0100);
    assert_eq!(cop0.cause() & CAUSE_BD, CAUSE_BD);
    assert_eq!(exc_code(cop0.cause()), 8);
    assert!(!cop0.vectoring_enabled());

    assert_eq!(cop0.eret(), Address::new(0x8002_0100));
    assert_eq!(cop0.status() & STATUS_EXL, 0);
    assert!(cop0.vectoring_enabled());
}

#[test]
fn address_errors_record_the_bad_address() {
    let mut cop0 = Cop0State::new();
    let _ = cop0.enter_exception(5, Address::new(0x8002_0000), false, Some(Address::new(0x1003)));
    assert_eq!(cop0.get(Cop0Register::BadVAddr), 0x1003);
    assert_eq!(cop0.cause() & CAUSE_BD, 0);
}

#[test]
fn timer_fires_when_count_reaches_compare() {
    let mut cop0 = Cop0State::new();
    cop0.set(Cop0Register::Compare, 10);
    cop0.advance(9);
    cop0.sync_interrupt_lines(0);
    assert_eq!(cop0.cause() & 0x8000, 0);

    cop0.advance(1);
    cop0.sync_interrupt_lines(0);
    assert_eq!(cop0.get(Cop0Register::Count), 10);
    assert_eq!(cop0.cause() & 0x8000, 0x8000);
    assert!(!cop0.interrupt_request());

    cop0.set(Cop0Register::Status, 0x8001);
    assert!(cop0.interrupt_request());

    cop0.set(Cop0Register::Compare, 100);
    cop0.sync_interrupt_lines(0);
    assert_eq!(cop0.cause() & 0x8000, 0);
}

#[test]
fn hardware_lines_mirror_into_cause() {
    let mut cop0 = Cop0State::new();
    cop0.sync_interrupt_lines(1 << 3);
    assert_eq!(cop0.cause(), 0x0800);
    cop0.set(Cop0Register::Status, 0x0401);
    assert!(!cop0.interrupt_request());
    cop0.set(Cop0Register::Status, 0x0801);
    assert!(cop0.interrupt_request());
}

// ══════════════════════════════════════════════════════════
// MFC0 and MTC0
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(false)]
#[case(true)]
fn mfc0_reads_back_mtc0_writes(#[case] pipelined: bool) {
    let mut ctx = context(pipelined, &[]).load_asm(&[
        "lui $2, 0x1234",
        "ori $2, $2, 0x5678",
        "mtc0 $2, $14",
        "mfc0 $3, $14",
        "ori $4, $0, 0xfffe",
        "mtc0 $4, $12",
        "mfc0 $5, $12",
        "mtc0 $4, $13",
        "mfc0 $6, $13",
        "mfc0 $7, $15, 1",
        "break",
    ]);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(3), 0x1234_5678);
    assert_eq!(ctx.get_reg(5), 0xff00);
    assert_eq!(ctx.get_reg(6), 0);
    assert_eq!(ctx.get_reg(7), 0x8000_0000);
}

#[rstest]
#[case(false, "mfc0 $2, $1")]
#[case(true, "mfc0 $2, $1")]
#[case(false, "mtc0 $2, $12, 3")]
#[case(true, "mtc0 $2, $12, 3")]
fn unimplemented_registers_are_unsupported(#[case] pipelined: bool, #[case] line: &str) {
    let mut ctx = context(pipelined, &[]).load_asm(&["addiu $2, $0, 1", line, "break"]);
    assert_eq!(
        ctx.run_to_stop(),
        StepOutcome::ExceptionStop(ExceptionCause::UnsupportedInstruction)
    );
}

// ══════════════════════════════════════════════════════════
// Vectored exceptions
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(false)]
#[case(true)]
fn syscall_enters_handler_and_returns_past_it(#[case] pipelined: bool) {
    let mut ctx = context(pipelined, &[ExceptionCause::Syscall]).load_asm(&[
        "ori $2, $0, 1",
        "mtc0 $2, $12",
        "addiu $4, $0, 5",
        "syscall",
        "addiu $5, $0, 6",
        "mtc0 $0, $12",
        "break",
    ]);
    load_handler(
        &mut ctx,
        &[
            "mfc0 $9, $13",
            "mfc0 $26, $14",
            "or $10, $26, $0",
            "addiu $26, $26, 4",
            "mtc0 $26, $14",
            "eret",
        ],
    );
    let syscall_pc = ctx.reset_pc() as u32 + 12;

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(10), syscall_pc);
    assert_eq!(exc_code(ctx.get_reg(9)), 8);
    assert_eq!(ctx.get_reg(9) & CAUSE_BD, 0);
    assert_eq!((ctx.get_reg(4), ctx.get_reg(5)), (5, 6));
    assert_eq!(ctx.cpu().cop0.status() & STATUS_EXL, 0);
    assert_eq!(ctx.cpu().stats.exceptions[ExceptionCause::Syscall.index()], 1);
}

#[rstest]
#[case(false)]
#[case(true)]
fn delay_slot_syscall_records_branch_and_bd(#[case] pipelined: bool) {
    let ctx = context(pipelined, &[ExceptionCause::Syscall]);
    let base = ctx.reset_pc();
    let program = ProgramBuilder::new(base)
        .asm("ori $2, $0, 1")
        .asm("mtc0 $2, $12")
        .asm(&format!("beq $0, $0, {:#x}", base + 0x14))
        .asm("syscall")
        .asm("addiu $4, $0, 1")
        .asm("break");
    let mut ctx = ctx.load_program(&program);
    // EXL is still set, so this `break` stops the run loop instead of vectoring.
    load_handler(&mut ctx, &["mfc0 $9, $13", "mfc0 $10, $14", "break"]);

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(u64::from(ctx.get_reg(10)), program.pc_of(2));
    assert_eq!(ctx.get_reg(9) & CAUSE_BD, CAUSE_BD);
    assert_eq!(exc_code(ctx.get_reg(9)), 8);
    assert_eq!(ctx.get_reg(4), 0);
}

#[rstest]
#[case(false)]
#[case(true)]
fn without_interrupt_enable_policy_still_applies(#[case] pipelined: bool) {
    let mut ctx = context(pipelined, &[]).load_asm(&["syscall", "addiu $2, $0, 1", "break"]);
    load_handler(&mut ctx, &["addiu $3, $0, 1", "eret"]);

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Syscall));
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!((ctx.get_reg(2), ctx.get_reg(3)), (1, 0));
    assert_eq!(ctx.cpu().cop0.epc(), 0);
}

// ══════════════════════════════════════════════════════════
// Interrupts
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(false)]
#[case(true)]
fn serial_receive_interrupt_runs_handler(#[case] pipelined: bool) {
    let ctx = context(pipelined, &[ExceptionCause::Interrupt]);
    ctx.serial.push_input(b"A");
    let base = ctx.reset_pc();
    let program = ProgramBuilder::new(base)
        // Receiver interrupt enable in RX_ST.
        .asm("addiu $2, $0, 2")
        .asm("sw $2, -0x4000($0)")
        // IE with IM3 unmasked.
        .asm("ori $2, $0, 0x801")
        .asm("mtc0 $2, $12")
        // Reading RX_ST latches the pending byte and raises the line.
        .asm("lw $3, -0x4000($0)")
        .asm(&format!("beq $8, $0, {:#x}", base + 0x14))
        .asm("nop")
        .asm("mtc0 $0, $12")
        .asm("break");
    let mut ctx = ctx.load_program(&program);
    load_handler(
        &mut ctx,
        &[
            "lw $8, -0x3ffc($0)",
            "mfc0 $9, $13",
            "mfc0 $10, $14",
            "eret",
        ],
    );

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(8), u32::from(b'A'));
    assert_eq!(exc_code(ctx.get_reg(9)), 0);
    assert_eq!(ctx.get_reg(9) & 0x0800, 0x0800);
    assert_eq!(u64::from(ctx.get_reg(10)), program.pc_of(5));
    assert_eq!(ctx.cpu().cop0.status() & STATUS_EXL, 0);
    assert_eq!(ctx.cpu().stats.exceptions[ExceptionCause::Interrupt.index()], 1);
}

#[rstest]
#[case(false)]
#[case(true)]
fn compare_match_interrupts_the_program(#[case] pipelined: bool) {
    let ctx = context(pipelined, &[ExceptionCause::Interrupt]);
    let base = ctx.reset_pc();
    let program = ProgramBuilder::new(base)
        .asm("ori $2, $0, 40")
        .asm("mtc0 $2, $11")
        .asm("ori $2, $0, 0x8001")
        .asm("mtc0 $2, $12")
        .asm(&format!("beq $11, $0, {:#x}", base + 0x10))
        .asm("nop")
        .asm("mtc0 $0, $12")
        .asm("break");
    let mut ctx = ctx.load_program(&program);
    // Writing Compare acknowledges the timer.
    load_handler(
        &mut ctx,
        &["mfc0 $9, $13", "addiu $11, $0, 1", "mtc0 $0, $11", "eret"],
    );

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(11), 1);
    assert_eq!(ctx.get_reg(9) & 0x8000, 0x8000);
    assert!(ctx.cycles() > 40);
    assert_eq!(ctx.cpu().stats.exceptions[ExceptionCause::Interrupt.index()], 1);
}
