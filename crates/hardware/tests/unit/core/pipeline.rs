//! Five-stage pipeline tests.
//!
//! Verifies the observable timing of the pipelined core:
//! 1. **Control Hazards:** Delay slot execution, wrong-path squashing and the
//!    cost of resolving branches in memory instead of execute.
//! 2. **Data Hazards:** Forwarding, stall-only and no detection, including the
//!    load-use bubble.
//! 3. **State:** Per-stage snapshots and counters exposed through `CoreState`.

use crate::common::builder::ProgramBuilder;
use crate::common::harness::TestContext;
use mipsim_core::StepOutcome;
use mipsim_core::common::ExceptionCause;
use mipsim_core::config::{BranchStage, HazardUnit, MachineConfig};
use mipsim_core::core::pipeline::state::Stage;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn pipelined(delay_slot: bool, branch_stage: BranchStage) -> TestContext {
    TestContext::with_config(MachineConfig {
        pipelined: true,
        delay_slot,
        branch_stage,
        ..MachineConfig::default()
    })
}

/// `j` over two instructions, with a marker in the delay slot.
fn jump_over(ctx: &TestContext) -> ProgramBuilder {
    let base = ctx.reset_pc();
    ProgramBuilder::new(base).lines(&[
        format!("j {:#x}", base + 0x10).as_str(),
        "addiu $2, $0, 1",
        "addiu $3, $0, 1",
        "addiu $3, $0, 2",
        "addiu $4, $0, 1",
        "break",
    ])
}

// ══════════════════════════════════════════════════════════
// Control hazards
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(true, BranchStage::Execute, 1, 0)]
#[case(false, BranchStage::Execute, 0, 1)]
#[case(true, BranchStage::Memory, 1, 1)]
#[case(false, BranchStage::Memory, 0, 2)]
fn jump_squashes_wrong_path(
    #[case] delay_slot: bool,
    #[case] branch_stage: BranchStage,
    #[case] slot_value: u32,
    #[case] flushes: u64,
) {
    let ctx = pipelined(delay_slot, branch_stage);
    let program = jump_over(&ctx);
    let mut ctx = ctx.load_program(&program);

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(2), slot_value);
    assert_eq!(ctx.get_reg(3), 0, "wrong-path instruction committed");
    assert_eq!(ctx.get_reg(4), 1);
    assert_eq!(ctx.cpu().stats.flushes, flushes);
    assert_eq!(ctx.cpu().stats.branches_taken, 1);
}

#[rstest]
#[case(true, BranchStage::Execute)]
#[case(false, BranchStage::Execute)]
#[case(true, BranchStage::Memory)]
#[case(false, BranchStage::Memory)]
fn squashed_instructions_never_raise_exceptions(
    #[case] delay_slot: bool,
    #[case] branch_stage: BranchStage,
) {
    let ctx = pipelined(delay_slot, branch_stage);
    let base = ctx.reset_pc();
    let program = ProgramBuilder::new(base)
        .asm(&format!("j {:#x}", base + 0x10))
        .asm("nop")
        .word(0xffff_ffff)
        .asm("syscall")
        .asm("addiu $4, $0, 1")
        .asm("break");
    let mut ctx = ctx.load_program(&program);

    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(ctx.get_reg(4), 1);
    let exceptions = &ctx.cpu().stats.exceptions;
    assert_eq!(exceptions[ExceptionCause::UnsupportedInstruction.index()], 0);
    assert_eq!(exceptions[ExceptionCause::Syscall.index()], 0);
}

#[test]
fn memory_stage_resolution_costs_one_cycle() {
    let run = |stage| {
        let ctx = pipelined(false, stage);
        let program = jump_over(&ctx);
        let mut ctx = ctx.load_program(&program);
        let _ = ctx.run_to_stop();
        ctx.cycles()
    };
    let execute = run(BranchStage::Execute);
    // The target `break` is fetched in cycle 4 and commits in MEM in cycle 7.
    assert_eq!(execute, 7);
    assert_eq!(run(BranchStage::Memory), execute + 1);
}

#[test]
fn untaken_branch_falls_through() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward);
    let base = ctx.reset_pc();
    ctx = ctx.load_asm(&[
        format!("bne $0, $0, {:#x}", base + 0x10).as_str(),
        "addiu $2, $0, 1",
        "addiu $3, $0, 1",
        "break",
    ]);
    let _ = ctx.run_to_stop();
    assert_eq!((ctx.get_reg(2), ctx.get_reg(3)), (1, 1));
    assert_eq!(ctx.cpu().stats.branches_taken, 0);
    assert_eq!(ctx.cpu().stats.flushes, 0);
}

#[test]
fn jal_links_past_the_delay_slot() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward);
    let base = ctx.reset_pc();
    ctx = ctx.load_asm(&[
        format!("jal {:#x}", base + 0x10).as_str(),
        "nop",
        "break",
        "nop",
        "jr $31",
        "nop",
    ]);
    assert_eq!(ctx.run_to_stop(), StepOutcome::ExceptionStop(ExceptionCause::Break));
    assert_eq!(u64::from(ctx.get_reg(31)), base + 8);
}

// ══════════════════════════════════════════════════════════
// Data hazards
// ══════════════════════════════════════════════════════════

const DATA: u64 = 0x1000;

fn load_use(unit: HazardUnit, dependent: bool) -> TestContext {
    let consumer = if dependent {
        "addu $3, $2, $2"
    } else {
        "addu $3, $4, $4"
    };
    let mut ctx = TestContext::pipelined(unit)
        .load_asm(&["lw $2, 4096($0)", consumer, "break"])
        .load_words(DATA, &[5]);
    ctx.set_reg(4, 1);
    let _ = ctx.run_to_stop();
    ctx
}

#[test]
fn independent_instructions_do_not_stall() {
    let ctx = load_use(HazardUnit::Forward, false);
    assert_eq!(ctx.cycles(), 6);
    assert_eq!(ctx.sim.state().stall_count, 0);
    assert_eq!(ctx.get_reg(3), 2);
}

#[test]
fn forwarding_costs_one_bubble_on_load_use() {
    let ctx = load_use(HazardUnit::Forward, true);
    assert_eq!(ctx.get_reg(3), 10);
    assert_eq!(ctx.sim.state().stall_count, 1);
    assert_eq!(ctx.cycles(), load_use(HazardUnit::Forward, false).cycles() + 1);
}

#[test]
fn stall_unit_waits_for_writeback() {
    let stall = load_use(HazardUnit::Stall, true);
    let forward = load_use(HazardUnit::Forward, true);
    assert_eq!(stall.get_reg(3), 10);
    assert_eq!(stall.sim.state().stall_count, 2);
    assert!(stall.cycles() >= forward.cycles());
    assert_eq!(stall.cpu().stats.stalls, 2);
}

#[test]
fn no_hazard_unit_reads_stale_register() {
    let none = load_use(HazardUnit::None, true);
    assert_eq!(none.get_reg(3), 0);
    assert_eq!(none.sim.state().stall_count, 0);
    assert_eq!(none.cycles(), load_use(HazardUnit::None, false).cycles());
}

#[rstest]
#[case(HazardUnit::Forward, 0, 14)]
#[case(HazardUnit::Stall, 2, 14)]
#[case(HazardUnit::None, 0, 0)]
fn alu_result_one_instruction_ahead(
    #[case] unit: HazardUnit,
    #[case] stalls: u64,
    #[case] expected: u32,
) {
    let mut ctx = TestContext::pipelined(unit).load_asm(&[
        "addiu $2, $0, 7",
        "addu $3, $2, $2",
        "break",
    ]);
    let _ = ctx.run_to_stop();
    assert_eq!(ctx.sim.state().stall_count, stalls);
    assert_eq!(ctx.get_reg(3), expected);
}

#[test]
fn register_written_in_writeback_is_read_in_the_same_cycle() {
    // Distance three needs no hazard handling at all.
    let mut ctx = TestContext::pipelined(HazardUnit::None).load_asm(&[
        "addiu $2, $0, 7",
        "nop",
        "nop",
        "addu $3, $2, $2",
        "break",
    ]);
    let _ = ctx.run_to_stop();
    assert_eq!(ctx.get_reg(3), 14);
}

#[test]
fn hi_lo_are_forwarded() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward).load_asm(&[
        "addiu $1, $0, 6",
        "addiu $2, $0, 7",
        "mult $1, $2",
        "mflo $3",
        "break",
    ]);
    let _ = ctx.run_to_stop();
    assert_eq!(ctx.get_reg(3), 42);
    assert_eq!(ctx.lo(), 42);
}

// ══════════════════════════════════════════════════════════
// Observable state
// ══════════════════════════════════════════════════════════

#[test]
fn stages_fill_in_order() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward).load_asm(&[
        "addiu $1, $0, 1",
        "addiu $2, $0, 2",
        "addiu $3, $0, 3",
        "addiu $4, $0, 4",
        "addiu $5, $0, 5",
    ]);
    let base = ctx.reset_pc();

    let _ = ctx.run(1);
    let state = ctx.sim.state();
    assert!(state.stage(Stage::Fetch).valid);
    assert_eq!(state.stage(Stage::Fetch).pc.val(), base);
    assert!(!state.stage(Stage::Decode).valid);

    let _ = ctx.run(4);
    let state = ctx.sim.state();
    for (i, stage) in Stage::ALL.iter().rev().enumerate() {
        let snap = state.stage(*stage);
        assert!(snap.valid, "{} empty", stage.name());
        assert_eq!(snap.pc.val(), base + 4 * i as u64);
    }
    assert_eq!(state.reg_write.map(|(reg, _)| reg), Some(1));
    assert_eq!(ctx.cpu().stats.instructions_retired, 1);
}

#[test]
fn stalled_cycle_inserts_bubble() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward)
        .load_asm(&["lw $2, 4096($0)", "addu $3, $2, $2", "break"])
        .load_words(DATA, &[5]);
    let _ = ctx.run(3);
    let state = ctx.sim.state();
    assert!(state.stalled);
    assert!(!state.id_ex.valid);
    // Fetch is held while decode waits.
    assert!(!state.stage(Stage::Fetch).valid);
    assert!(state.if_id.valid);
}

#[test]
fn load_records_memory_access() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward)
        .load_asm(&["lw $2, 4096($0)", "break"])
        .load_words(DATA, &[0xdead_beef]);
    let _ = ctx.run(4);
    let access = ctx.sim.state().mem_access.expect("load in memory stage");
    assert_eq!(access.addr.val(), DATA);
    assert!(!access.write);
    assert_eq!(access.value, 0xdead_beef);
}
