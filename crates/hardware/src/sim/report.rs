//! End-of-run report.
//!
//! This module renders the machine state once a run stops. It provides:
//! 1. **Console Report:** Registers, cache statistics and cycle counts as text lines.
//! 2. **Memory Dumps:** Word ranges written to files, one `0x........` word per line.
//! 3. **JSON Dump:** The same data serialised with `serde_json`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::common::constants::REGISTER_COUNT;
use crate::common::{Address, Cop0Register, SimError};
use crate::core::units::cache::Cache;
use crate::sim::simulator::Simulator;

/// A memory range dumped to a file at the end of the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DumpRange {
    /// First byte; rounded down to a word boundary.
    pub start: Address,
    /// Length in bytes.
    pub len: u64,
    /// Output file.
    pub path: PathBuf,
}

/// What the reporter emits.
#[derive(Clone, Debug, Default)]
pub struct ReportOptions {
    /// PC, general-purpose registers, HI and LO.
    pub registers: bool,
    /// Per-cache statistics.
    pub cache_stats: bool,
    /// Cycle and stall counts.
    pub cycles: bool,
    /// Memory ranges written to files.
    pub dump_ranges: Vec<DumpRange>,
    /// JSON output file.
    pub json: Option<PathBuf>,
}

/// Statistics of one cache.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheReport {
    /// Words read from the level below.
    pub reads: u64,
    /// Read and write hits.
    pub hit: u64,
    /// Read and write misses.
    pub miss: u64,
    /// Hit rate in percent.
    pub hit_rate: f64,
    /// Estimated cycles stalled on misses.
    pub stalled_cycles: u64,
    /// Speed-up over the uncached machine in percent.
    pub improved_speed: f64,
}

impl CacheReport {
    fn from_cache(cache: &Cache) -> Self {
        Self {
            reads: cache.stats().mem_reads,
            hit: cache.hits(),
            miss: cache.misses(),
            hit_rate: cache.hit_rate(),
            stalled_cycles: cache.stall_count(),
            improved_speed: cache.speed_improvement(),
        }
    }
}

/// Cycle counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Cycles executed.
    pub cycles: u64,
    /// Cycles decode stalled.
    pub stalls: u64,
}

/// Collected report data; also the JSON document layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Report {
    /// Register name to `0x........` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regs: Option<BTreeMap<String, String>>,
    /// Cache name to statistics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caches: Option<BTreeMap<String, CacheReport>>,
    /// Cycle counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycles: Option<CycleReport>,
}

/// Renders the end-of-run report.
#[derive(Clone, Debug, Default)]
pub struct Reporter {
    options: ReportOptions,
}

impl Reporter {
    /// Creates a reporter.
    pub const fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Report settings.
    pub const fn options(&self) -> &ReportOptions {
        &self.options
    }

    /// Returns `true` if there is anything to report.
    pub fn is_empty(&self) -> bool {
        let o = &self.options;
        !o.registers && !o.cache_stats && !o.cycles && o.dump_ranges.is_empty() && o.json.is_none()
    }

    /// Gathers the enabled report sections.
    pub fn collect(&self, sim: &Simulator) -> Report {
        let cpu = &sim.cpu;
        let mut report = Report::default();

        if self.options.registers {
            let mut regs = BTreeMap::new();
            let _ = regs.insert("PC".to_string(), format!("0x{:08x}", cpu.regs.read_pc().as_u32()));
            for i in 0..REGISTER_COUNT as u8 {
                let _ = regs.insert(format!("R{i}"), format!("0x{:08x}", cpu.regs.read_gp(i).as_u32()));
            }
            let _ = regs.insert("HI".to_string(), format!("0x{:08x}", cpu.regs.read_hi().as_u32()));
            let _ = regs.insert("LO".to_string(), format!("0x{:08x}", cpu.regs.read_lo().as_u32()));
            for reg in Cop0Register::ALL {
                let _ = regs.insert(format!("C0_{}", reg.name()), format!("0x{:08x}", cpu.cop0.get(reg)));
            }
            report.regs = Some(regs);
        }

        if self.options.cache_stats {
            let mut caches = BTreeMap::new();
            let _ = caches.insert("i-cache".to_string(), CacheReport::from_cache(&cpu.mem.icache));
            let _ = caches.insert("d-cache".to_string(), CacheReport::from_cache(&cpu.mem.dcache));
            if cpu.mem.l2.enabled() {
                let _ = caches.insert("l2-cache".to_string(), CacheReport::from_cache(&cpu.mem.l2));
            }
            report.caches = Some(caches);
        }

        if self.options.cycles {
            report.cycles = Some(CycleReport {
                cycles: cpu.state.cycle_count,
                stalls: cpu.state.stall_count,
            });
        }
        report
    }

    /// Writes the console report to `out`, then the dump files and JSON document.
    pub fn report(&self, sim: &mut Simulator, out: &mut dyn Write) -> Result<(), SimError> {
        let report = self.collect(sim);
        if report.regs.is_some() || report.cycles.is_some() {
            writeln!(out, "Machine state report:")?;
        }
        if report.regs.is_some() {
            write_registers(sim, out)?;
        }
        if let Some(caches) = &report.caches {
            writeln!(out, "Cache statistics report:")?;
            for (name, cache) in caches {
                write_cache(name, cache, out)?;
            }
        }
        if let Some(cycles) = &report.cycles {
            writeln!(out, "cycles: {}", cycles.cycles)?;
            writeln!(out, "stalls: {}", cycles.stalls)?;
        }

        for range in &self.options.dump_ranges {
            dump_range(sim, range)?;
        }

        if let Some(path) = &self.options.json {
            let file = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(file, &report)?;
            info!(path = %path.display(), "JSON report written");
        }
        Ok(())
    }
}

fn write_registers(sim: &Simulator, out: &mut dyn Write) -> io::Result<()> {
    let regs = &sim.cpu.regs;
    writeln!(out, "PC:0x{:08x}", regs.read_pc().as_u32())?;
    let line: Vec<String> = (0..REGISTER_COUNT as u8)
        .map(|i| format!("R{i}:0x{:08x}", regs.read_gp(i).as_u32()))
        .collect();
    writeln!(out, "{}", line.join(" "))?;
    writeln!(
        out,
        "HI:0x{:08x} LO:0x{:08x}",
        regs.read_hi().as_u32(),
        regs.read_lo().as_u32()
    )
}

fn write_cache(name: &str, cache: &CacheReport, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{name}:reads: {}", cache.reads)?;
    writeln!(out, "{name}:hit: {}", cache.hit)?;
    writeln!(out, "{name}:miss: {}", cache.miss)?;
    writeln!(out, "{name}:hit-rate: {:.3}", cache.hit_rate)?;
    writeln!(out, "{name}:stalled-cycles: {}", cache.stalled_cycles)?;
    writeln!(out, "{name}:improved-speed: {:.3}", cache.improved_speed)
}

/// Writes one word per line, seen through the data caches.
fn dump_range(sim: &mut Simulator, range: &DumpRange) -> io::Result<()> {
    let start = range.start.align_down(4);
    let end = range.start.val().saturating_add(range.len).min(1 << 32);
    let mut out = BufWriter::new(File::create(&range.path)?);
    let mut addr = start.val();
    while addr < end {
        let word = sim.cpu.mem.peek_word(Address::new(addr));
        writeln!(out, "0x{word:08x}")?;
        addr += 4;
    }
    out.flush()?;
    info!(start = %start, len = range.len, path = %range.path.display(), "memory range dumped");
    Ok(())
}
