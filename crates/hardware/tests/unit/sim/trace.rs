//! Tracer output tests.

use crate::common::harness::TestContext;
use mipsim_core::common::Address;
use mipsim_core::config::HazardUnit;
use mipsim_core::isa::disasm::disassemble;
use mipsim_core::sim::{TraceOptions, Tracer};
use pretty_assertions::assert_eq;

fn tracer(configure: impl FnOnce(&mut TraceOptions)) -> Tracer {
    let mut options = TraceOptions::default();
    configure(&mut options);
    Tracer::new(options)
}

#[test]
fn empty_options_trace_nothing() {
    let mut ctx = TestContext::new().load_asm(&["addiu $2, $0, 5"]);
    let _ = ctx.run(1);
    let t = Tracer::default();
    assert!(t.options().is_empty());
    assert!(t.lines(ctx.sim.state()).is_empty());
}

#[test]
fn fetch_pc_and_register_lines() {
    let mut ctx = TestContext::new().load_asm(&["addiu $2, $0, 5"]);
    let _ = ctx.run(1);
    let t = tracer(|o| {
        o.fetch = true;
        o.pc = true;
        o.trace_gp(2);
    });
    let base = ctx.reset_pc();
    let text = disassemble(ctx.peek(base), Address::new(base));
    assert_eq!(
        t.lines(ctx.sim.state()),
        vec![
            format!("Fetch: {text}"),
            "PC: 80020000".to_string(),
            "GP 2: 5".to_string(),
        ]
    );
}

#[test]
fn untraced_registers_are_silent() {
    let mut ctx = TestContext::new().load_asm(&["addiu $2, $0, 5"]);
    let _ = ctx.run(1);
    let t = tracer(|o| o.trace_gp(3));
    assert!(t.lines(ctx.sim.state()).is_empty());
}

#[test]
fn memory_accesses_are_traced_by_direction() {
    let mut ctx = TestContext::new().load_asm(&[
        "addiu $2, $0, 0x2a",
        "sw $2, 0x400($0)",
        "lw $3, 0x400($0)",
    ]);
    let t = tracer(|o| {
        o.mem_write = true;
        o.mem_read = true;
    });
    let mut lines = Vec::new();
    for _ in 0..3 {
        let _ = ctx.run(1);
        lines.extend(t.lines(ctx.sim.state()));
    }
    assert_eq!(lines, vec!["MEM[400]: WR 2a", "MEM[400]: RD 2a"]);
}

#[test]
fn hi_lo_writes() {
    let mut ctx = TestContext::new().load_asm(&[
        "addiu $1, $0, 3",
        "addiu $2, $0, 0x10",
        "divu $2, $1",
    ]);
    let _ = ctx.run(3);
    let t = tracer(|o| {
        o.hi = true;
        o.lo = true;
    });
    assert_eq!(t.lines(ctx.sim.state()), vec!["LO: 5", "HI: 1"]);
}

#[test]
fn bubbles_print_as_nop_and_exceptions_are_marked() {
    let mut ctx = TestContext::pipelined(HazardUnit::Forward).load_asm(&["break"]);
    let t = tracer(|o| {
        o.decode = true;
        o.memory = true;
    });
    let _ = ctx.run(1);
    assert_eq!(t.lines(ctx.sim.state()), vec!["Decode: nop", "Memory: nop"]);

    let _ = ctx.run(3);
    let base = ctx.reset_pc();
    let expected = format!("Memory: !{}", disassemble(ctx.peek(base), Address::new(base)));
    assert_eq!(t.lines(ctx.sim.state())[1], expected);
}

#[test]
fn write_cycle_emits_one_line_per_signal() {
    let mut ctx = TestContext::new().load_asm(&["addiu $2, $0, 5"]);
    let _ = ctx.run(1);
    let t = tracer(|o| {
        o.pc = true;
        o.trace_all_gp();
    });
    let mut sink = Vec::new();
    t.write_cycle(ctx.sim.state(), &mut sink).unwrap();
    assert_eq!(String::from_utf8(sink).unwrap(), "PC: 80020000\nGP 2: 5\n");
}
