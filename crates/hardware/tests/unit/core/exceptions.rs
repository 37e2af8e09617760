//! Exception commit and policy tests.
//!
//! Every cause is committed in the memory stage. Stop-on reports the cause to
//! the run loop; step-over retires the instruction as a no-op, otherwise the
//! core traps and refuses further cycles.

use crate::common::harness::TestContext;
use mipsim_core::common::ExceptionCause;
use mipsim_core::config::{ExceptionPolicy, MachineConfig};
use mipsim_core::{CoreStatus, StepOutcome};
use pretty_assertions::assert_eq;
use rstest::rstest;

const OVERFLOW: &[&str] = &[
    "lui $1, 0x7fff",
    "ori $1, $1, 0xffff",
    "addi $2, $1, 1",
    "addiu $3, $0, 1",
    "break",
];

fn with_policy(pipelined: bool, cause: ExceptionCause, stop: bool, step_over: bool) -> TestContext {
    let mut exceptions = ExceptionPolicy::default();
    exceptions.set_stop_on(cause, stop);
    exceptions.set_step_over(cause, step_over);
    TestContext::with_config(MachineConfig {
        pipelined,
        exceptions,
        ..MachineConfig::default()
    })
}

// ══════════════════════════════════════════════════════════
// Stop and step-over policy
// ══════════════════════════════════════════════════════════

#[test]
fn break_stops_and_can_be_resumed() {
    let mut ctx = TestContext::new().load_asm(&["break", "addiu $2, $0, 1", "break"]);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.sim.state().status, CoreStatus::Running);
    assert_eq!(ctx.get_reg(2), 0);

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(2), 1);
    assert_eq!(ctx.cpu().stats.exceptions[ExceptionCause::Break.index()], 2);
}

#[rstest]
#[case(false)]
#[case(true)]
fn stepped_over_overflow_discards_result(#[case] pipelined: bool) {
    let mut ctx = with_policy(pipelined, ExceptionCause::Overflow, true, true).load_asm(OVERFLOW);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Overflow));
    assert_eq!(ctx.sim.state().last_exception, ExceptionCause::Overflow);

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(2), 0);
    assert_eq!(ctx.get_reg(3), 1);
}

#[rstest]
#[case(false)]
#[case(true)]
fn overflow_without_step_over_traps(#[case] pipelined: bool) {
    let mut ctx = with_policy(pipelined, ExceptionCause::Overflow, false, false).load_asm(OVERFLOW);
    assert_eq!(ctx.run_to_stop(), StepOutcome::Trapped(ExceptionCause::Overflow));
    assert_eq!(
        ctx.sim.state().status,
        CoreStatus::Trapped(ExceptionCause::Overflow)
    );
    // Younger instructions never commit.
    assert_eq!(ctx.get_reg(3), 0);

    let cycles = ctx.cycles();
    assert_eq!(ctx.sim.step(), StepOutcome::Trapped(ExceptionCause::Overflow));
    assert_eq!(ctx.cycles(), cycles);
}

#[test]
fn stop_takes_precedence_over_trap_in_the_reported_outcome() {
    let mut ctx = with_policy(false, ExceptionCause::Overflow, true, false).load_asm(OVERFLOW);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Overflow));
    assert!(!ctx.sim.state().is_running());
}

#[test]
fn silent_step_over_runs_through() {
    let mut ctx = with_policy(false, ExceptionCause::Overflow, false, true).load_asm(OVERFLOW);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.cpu().stats.exceptions[ExceptionCause::Overflow.index()], 1);
}

// ══════════════════════════════════════════════════════════
// Causes
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(&["syscall"], ExceptionCause::Syscall)]
#[case(&["lw $2, 2($0)"], ExceptionCause::UnalignedAddress)]
#[case(&["sh $2, 1($0)"], ExceptionCause::UnalignedAddress)]
#[case(&["addiu $4, $0, 6", "jr $4", "nop"], ExceptionCause::UnalignedJump)]
fn instruction_causes(#[case] program: &[&str], #[case] cause: ExceptionCause) {
    let mut ctx = TestContext::new().load_asm(program);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(cause));
}

#[rstest]
#[case(false)]
#[case(true)]
fn unsupported_instruction_is_reported(#[case] pipelined: bool) {
    let ctx = TestContext::with_config(MachineConfig {
        pipelined,
        ..MachineConfig::default()
    });
    let base = ctx.reset_pc();
    let mut ctx = ctx.load_words(base, &[0xffff_ffff]);
    assert_eq!(
        ctx.run_to_stop(),
        StepOutcome::ExceptionStop(ExceptionCause::UnsupportedInstruction)
    );
}

#[test]
fn cycle_limit_halts_the_core() {
    let ctx = TestContext::with_config(MachineConfig {
        pipelined: true,
        cycle_limit: Some(50),
        ..MachineConfig::default()
    });
    let base = ctx.reset_pc();
    let mut ctx = ctx.load_asm(&[format!("j {base:#x}").as_str(), "nop"]);

    assert_eq!(ctx.sim.run(None), StepOutcome::CycleLimit);
    assert_eq!(ctx.cycles(), 50);
    assert_eq!(ctx.sim.state().status, CoreStatus::Halted);
    assert_eq!(ctx.sim.step(), StepOutcome::CycleLimit);
}

// ══════════════════════════════════════════════════════════
// Interrupts
// ══════════════════════════════════════════════════════════

/// Enables the serial transmit interrupt, whose line is raised at once.
const ENABLE_TX_IRQ: &[&str] = &[
    "addiu $2, $0, 2",
    "sw $2, 0xc008($0)",
    "addiu $3, $0, 1",
    "break",
];

#[test]
fn masked_interrupt_is_ignored() {
    let mut ctx = TestContext::new().load_asm(ENABLE_TX_IRQ);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(3), 1);
    assert_ne!(ctx.cpu().interrupts.pending(), 0);
}

#[test]
fn unmasked_interrupt_replaces_next_instruction() {
    let mut ctx = TestContext::with_config(MachineConfig {
        interrupt_mask: 1 << 2,
        ..MachineConfig::default()
    })
    .load_asm(ENABLE_TX_IRQ);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Interrupt));
    assert_eq!(
        ctx.sim.state().status,
        CoreStatus::Trapped(ExceptionCause::Interrupt)
    );
    assert_eq!(ctx.get_reg(3), 0);
}
