//! Statistics counters observed over real runs.

use crate::common::harness::TestContext;
use mipsim_core::StepOutcome;
use mipsim_core::common::ExceptionCause;
use mipsim_core::config::{ExceptionPolicy, HazardUnit, MachineConfig};
use mipsim_core::isa::OperationKind;
use mipsim_core::stats::{STATS_SECTIONS, SimStats};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Three loop iterations, a call and a return.
fn mixed(ctx: TestContext) -> TestContext {
    let base = ctx.reset_pc();
    ctx.load_asm(&[
        "addiu $1, $0, 3",
        "lw $2, 0x100($0)",
        "sw $2, 0x104($0)",
        "addiu $1, $1, -1",
        format!("bne $1, $0, {:#x}", base + 4).as_str(),
        "nop",
        format!("jal {:#x}", base + 0x24).as_str(),
        "nop",
        "break",
        "jr $31",
        "nop",
    ])
}

#[rstest]
#[case(false)]
#[case(true)]
fn instruction_mix(#[case] pipelined: bool) {
    let mut ctx = mixed(TestContext::with_config(MachineConfig {
        pipelined,
        hazard_unit: HazardUnit::Forward,
        ..MachineConfig::default()
    }));
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));

    let stats = &ctx.cpu().stats;
    assert_eq!(stats.inst_alu, 9);
    assert_eq!(stats.inst_load, 3);
    assert_eq!(stats.inst_store, 3);
    assert_eq!(stats.inst_branch, 3);
    assert_eq!(stats.inst_jump, 2);
    // Pipelined: the `jr $31` behind the break resolves in EX in the cycle the
    // break commits, so it is counted although it never retires.
    assert_eq!(stats.branches_taken, if pipelined { 5 } else { 4 });
    assert_eq!(stats.exceptions[ExceptionCause::Break.index()], 1);
    assert_eq!(stats.cycles, ctx.cycles());
    assert_eq!(stats.stalls, ctx.sim.state().stall_count);
    if pipelined {
        // The break stops the run from the memory stage, before its writeback.
        assert_eq!((stats.inst_system, stats.instructions_retired), (0, 20));
        let _ = ctx.run(1);
        assert_eq!(ctx.cpu().stats.inst_system, 1);
    } else {
        // The stepped-over break retires as a no-op.
        assert_eq!((stats.inst_system, stats.instructions_retired), (1, 21));
        assert_eq!(stats.cycles, 21);
    }
}

#[test]
fn trapped_instruction_does_not_retire() {
    let mut exceptions = ExceptionPolicy::default();
    exceptions.set_step_over(ExceptionCause::Syscall, false);
    let mut ctx = TestContext::with_config(MachineConfig {
        exceptions,
        ..MachineConfig::default()
    })
    .load_asm(&["addiu $2, $0, 1", "syscall"]);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Syscall));
    let stats = &ctx.cpu().stats;
    assert_eq!(stats.instructions_retired, 1);
    assert_eq!(stats.inst_system, 0);
    assert_eq!(stats.exceptions[ExceptionCause::Syscall.index()], 1);
}

#[test]
fn flushes_count_squashed_instructions() {
    let mut ctx = TestContext::with_config(MachineConfig {
        pipelined: true,
        delay_slot: false,
        ..MachineConfig::default()
    });
    let base = ctx.reset_pc();
    ctx = ctx.load_asm(&[
        format!("j {:#x}", base + 0xc).as_str(),
        "addiu $2, $0, 1",
        "addiu $3, $0, 1",
        "break",
    ]);
    let _ = ctx.run_to_stop();
    assert_eq!(ctx.cpu().stats.flushes, 1);
    assert_eq!(ctx.get_reg(2), 0);
}

#[test]
fn retire_classifies_kinds() {
    let mut stats = SimStats::default();
    for kind in [
        OperationKind::Arithmetic,
        OperationKind::ArithmeticImmediate,
        OperationKind::Shift,
        OperationKind::Load,
        OperationKind::Store,
        OperationKind::Branch,
        OperationKind::Jump,
        OperationKind::System,
    ] {
        stats.retire(kind);
    }
    assert_eq!(stats.instructions_retired, 8);
    assert_eq!(stats.inst_alu, 3);
    assert_eq!(
        (stats.inst_load, stats.inst_store, stats.inst_branch, stats.inst_jump, stats.inst_system),
        (1, 1, 1, 1, 1)
    );
}

#[test]
fn reset_clears_counters() {
    let mut ctx = mixed(TestContext::new());
    let _ = ctx.run_to_stop();
    ctx.sim.reset();
    let stats = &ctx.cpu().stats;
    assert_eq!(stats.cycles, 0);
    assert_eq!(stats.instructions_retired, 0);
    assert!(stats.exceptions.iter().all(|&n| n == 0));
}

#[test]
fn section_names_are_accepted() {
    let stats = SimStats::default();
    stats.print_sections(&STATS_SECTIONS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    stats.print_sections(&[]);
}
