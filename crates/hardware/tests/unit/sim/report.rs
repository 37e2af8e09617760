//! End-of-run report tests.

use crate::common::harness::TestContext;
use mipsim_core::common::Address;
use mipsim_core::config::{CacheConfig, MachineConfig, ReplacementPolicy, WritePolicy};
use mipsim_core::sim::{DumpRange, ReportOptions, Reporter};

fn finished() -> TestContext {
    let mut ctx = TestContext::new().load_asm(&[
        "addiu $2, $0, 0x11",
        "sw $2, 0x100($0)",
        "addiu $3, $0, 0x22",
        "sw $3, 0x104($0)",
        "break",
    ]);
    let _ = ctx.run_to_stop();
    ctx
}

fn render(reporter: &Reporter, ctx: &mut TestContext) -> String {
    let mut out = Vec::new();
    reporter.report(&mut ctx.sim, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn nothing_enabled_prints_nothing() {
    let mut ctx = finished();
    let reporter = Reporter::default();
    assert!(reporter.is_empty());
    assert_eq!(render(&reporter, &mut ctx), "");
}

#[test]
fn registers_and_cycles() {
    let mut ctx = finished();
    let reporter = Reporter::new(ReportOptions {
        registers: true,
        cycles: true,
        ..ReportOptions::default()
    });
    let text = render(&reporter, &mut ctx);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Machine state report:");
    assert_eq!(lines[1], "PC:0x80020014");
    assert!(lines[2].starts_with("R0:0x00000000 R1:0x00000000 R2:0x00000011 R3:0x00000022"));
    assert_eq!(lines[3], "HI:0x00000000 LO:0x00000000");
    assert_eq!(lines[4], "cycles: 5");
    assert_eq!(lines[5], "stalls: 0");
}

#[test]
fn cache_section_lists_enabled_level2_only() {
    let config = MachineConfig {
        cache_data: CacheConfig::new(2, 1, 1, ReplacementPolicy::Lru, WritePolicy::WriteBack),
        ..MachineConfig::default()
    };
    let mut ctx = TestContext::with_config(config).load_asm(&["lw $2, 0x100($0)", "lw $2, 0x100($0)", "break"]);
    let _ = ctx.run_to_stop();
    let reporter = Reporter::new(ReportOptions {
        cache_stats: true,
        ..ReportOptions::default()
    });
    let text = render(&reporter, &mut ctx);
    assert!(text.starts_with("Cache statistics report:\n"));
    assert!(text.contains("d-cache:hit: 1\n"));
    assert!(text.contains("d-cache:miss: 1\n"));
    assert!(text.contains("d-cache:hit-rate: 50.000\n"));
    assert!(text.contains("i-cache:reads: 3\n"));
    assert!(!text.contains("l2-cache"));

    let report = reporter.collect(&ctx.sim);
    let caches = report.caches.unwrap();
    assert_eq!(caches["d-cache"].stalled_cycles, 9);
}

#[test]
fn dump_ranges_write_one_word_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.txt");
    let mut ctx = finished();
    let reporter = Reporter::new(ReportOptions {
        dump_ranges: vec![DumpRange {
            start: Address::new(0x102),
            len: 8,
            path: path.clone(),
        }],
        ..ReportOptions::default()
    });
    assert_eq!(render(&reporter, &mut ctx), "");
    let dumped = std::fs::read_to_string(&path).unwrap();
    // The start is aligned down; the end stays where start + len puts it.
    assert_eq!(dumped, "0x00000011\n0x00000022\n0x00000000\n");
}

#[test]
fn json_document_mirrors_enabled_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let mut ctx = finished();
    let reporter = Reporter::new(ReportOptions {
        registers: true,
        cycles: true,
        json: Some(path.clone()),
        ..ReportOptions::default()
    });
    let _ = render(&reporter, &mut ctx);

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(doc["cycles"]["cycles"], 5);
    assert_eq!(doc["regs"]["R3"], "0x00000022");
    assert_eq!(doc["regs"]["PC"], "0x80020014");
    assert_eq!(doc["regs"]["C0_EBase"], "0x80000000");
    assert!(doc.get("caches").is_none());
}
