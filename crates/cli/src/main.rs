//! MIPS32 cycle-accurate simulator CLI.
//!
//! This binary loads an ELF executable or a raw big-endian image and runs it. It performs:
//! 1. **Machine setup:** Builds the configuration from a JSON file and command-line overrides.
//! 2. **Run loop:** Steps the simulator until a stop, a trap or the cycle limit.
//! 3. **Tracing:** Prints the selected per-cycle signals.
//! 4. **Reporting:** Prints registers, cache statistics and cycle counts, and writes dumps.
//!
//! Exit status: 0 on a normal stop, 1 on an unexpected trap (or a missing expected one),
//! 2 when the cycle limit is reached unless `--cycle-limit-ok` is given.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mipsim_core::common::{Address, ExceptionCause, SimError};
use mipsim_core::config::{BranchStage, CacheConfig, HazardUnit, MachineConfig};
use mipsim_core::sim::{DumpRange, ProgramImage, ReportOptions, Reporter, TraceOptions, Tracer};
use mipsim_core::soc::devices::{BufferedSerial, SerialHost, StdoutSerial};
use mipsim_core::{Simulator, StepOutcome};

/// Errors reported by the command-line driver.
#[derive(Debug, Error)]
enum CliError {
    /// A numeric argument could not be parsed.
    #[error("invalid number `{0}`")]
    Number(String),
    /// A structured argument had the wrong shape.
    #[error("invalid {what} `{value}`")]
    Argument {
        /// Which option.
        what: &'static str,
        /// Offending text.
        value: String,
    },
    /// Simulator error.
    #[error(transparent)]
    Sim(#[from] SimError),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "mipsim",
    author,
    version,
    about = "MIPS32 cycle-accurate teaching simulator",
    long_about = "Run a big-endian MIPS32 ELF executable or raw image on a single-cycle or five-stage pipelined core.\n\nExamples:\n  mipsim prog.bin --pipelined --hazard-unit forward --dump-cycles\n  mipsim prog.bin --d-cache lru,4,2,2,wb --dump-cache-stats"
)]
struct Cli {
    /// ELF executable or raw image to load.
    image: PathBuf,

    /// JSON machine configuration; command-line options override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the five-stage pipelined core.
    #[arg(long)]
    pipelined: bool,

    /// Disable branch delay slots.
    #[arg(long)]
    no_delay_slot: bool,

    /// Hazard unit of the pipelined core (none, stall, forward).
    #[arg(long, value_parser = parse_hazard_unit)]
    hazard_unit: Option<HazardUnit>,

    /// Stage resolving branches (execute, memory).
    #[arg(long, value_parser = parse_branch_stage)]
    branch_stage: Option<BranchStage>,

    /// Program cache: policy,sets,blocksize,assoc[,writepolicy].
    #[arg(long)]
    i_cache: Option<CacheConfig>,

    /// Data cache: policy,sets,blocksize,assoc[,writepolicy].
    #[arg(long)]
    d_cache: Option<CacheConfig>,

    /// Level-2 cache: policy,sets,blocksize,assoc[,writepolicy].
    #[arg(long)]
    l2_cache: Option<CacheConfig>,

    /// Main memory read latency in cycles.
    #[arg(long)]
    read_time: Option<u32>,

    /// Main memory write latency in cycles.
    #[arg(long)]
    write_time: Option<u32>,

    /// Burst word latency in cycles; enables burst accounting.
    #[arg(long)]
    burst_time: Option<u32>,

    /// Stop after this many cycles.
    #[arg(long)]
    cycle_limit: Option<u64>,

    /// Exit with status 0 when the cycle limit is reached.
    #[arg(long)]
    cycle_limit_ok: bool,

    /// Address a raw image is loaded at (default: reset PC). ELF files use their own addresses.
    #[arg(long, value_parser = parse_number)]
    load_address: Option<u64>,

    /// Extra data loaded before the run: START,FILE.
    #[arg(long, value_parser = parse_load_range)]
    load_range: Vec<(u64, PathBuf)>,

    /// Trace the instruction in fetch.
    #[arg(long)]
    trace_fetch: bool,

    /// Trace the instruction in decode.
    #[arg(long)]
    trace_decode: bool,

    /// Trace the instruction in execute.
    #[arg(long)]
    trace_execute: bool,

    /// Trace the instruction in memory.
    #[arg(long)]
    trace_memory: bool,

    /// Trace the instruction in writeback.
    #[arg(long)]
    trace_writeback: bool,

    /// Trace the fetch address.
    #[arg(long)]
    trace_pc: bool,

    /// Trace writes to a general-purpose register (number or `*`).
    #[arg(long)]
    trace_gp: Vec<String>,

    /// Trace HI writes.
    #[arg(long)]
    trace_hi: bool,

    /// Trace LO writes.
    #[arg(long)]
    trace_lo: bool,

    /// Trace data loads.
    #[arg(long)]
    trace_rdmem: bool,

    /// Trace data stores.
    #[arg(long)]
    trace_wrmem: bool,

    /// Print registers at the end of the run.
    #[arg(long)]
    dump_registers: bool,

    /// Print cache statistics at the end of the run.
    #[arg(long)]
    dump_cache_stats: bool,

    /// Print cycle and stall counts at the end of the run.
    #[arg(long)]
    dump_cycles: bool,

    /// Print run statistics at the end of the run.
    #[arg(long)]
    dump_stats: bool,

    /// Write memory to a file at the end of the run: START,LEN,FILE.
    #[arg(long, value_parser = parse_dump_range)]
    dump_range: Vec<DumpRange>,

    /// Write the report as JSON.
    #[arg(long)]
    dump_json: Option<PathBuf>,

    /// The run is expected to stop on an exception other than BREAK.
    #[arg(long)]
    expect_fail: bool,

    /// Bytes fed to the serial receiver.
    #[arg(long)]
    serial_in: Option<PathBuf>,

    /// File receiving serial output instead of stdout.
    #[arg(long)]
    serial_out: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!(%e, "simulation failed");
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal number.
fn parse_number(text: &str) -> Result<u64, CliError> {
    let text = text.trim();
    let parsed = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .map_or_else(|| text.parse(), |hex| u64::from_str_radix(hex, 16));
    parsed.map_err(|_| CliError::Number(text.to_string()))
}

fn parse_hazard_unit(text: &str) -> Result<HazardUnit, CliError> {
    text.parse().map_err(|_| CliError::Argument {
        what: "hazard unit",
        value: text.to_string(),
    })
}

fn parse_branch_stage(text: &str) -> Result<BranchStage, CliError> {
    match text.to_ascii_lowercase().as_str() {
        "execute" | "ex" => Ok(BranchStage::Execute),
        "memory" | "mem" => Ok(BranchStage::Memory),
        _ => Err(CliError::Argument {
            what: "branch stage",
            value: text.to_string(),
        }),
    }
}

fn parse_load_range(text: &str) -> Result<(u64, PathBuf), CliError> {
    let (start, path) = text.split_once(',').ok_or_else(|| CliError::Argument {
        what: "load range",
        value: text.to_string(),
    })?;
    Ok((parse_number(start)?, PathBuf::from(path)))
}

fn parse_dump_range(text: &str) -> Result<DumpRange, CliError> {
    let bad = || CliError::Argument {
        what: "dump range",
        value: text.to_string(),
    };
    let mut parts = text.splitn(3, ',');
    let start = parts.next().ok_or_else(bad)?;
    let len = parts.next().ok_or_else(bad)?;
    let path = parts.next().ok_or_else(bad)?;
    Ok(DumpRange {
        start: Address::new(parse_number(start)?),
        len: parse_number(len)?,
        path: PathBuf::from(path),
    })
}

/// Builds the machine configuration from the JSON file and overrides.
fn machine_config(cli: &Cli) -> Result<MachineConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => MachineConfig::from_json_file(path)?,
        None => MachineConfig::default(),
    };
    if cli.pipelined {
        config.pipelined = true;
    }
    if cli.no_delay_slot {
        config.delay_slot = false;
    }
    if let Some(unit) = cli.hazard_unit {
        config.hazard_unit = unit;
    }
    if let Some(stage) = cli.branch_stage {
        config.branch_stage = stage;
    }
    if let Some(cache) = cli.i_cache {
        config.cache_program = cache;
    }
    if let Some(cache) = cli.d_cache {
        config.cache_data = cache;
    }
    if let Some(cache) = cli.l2_cache {
        config.cache_level2 = cache;
    }
    if let Some(read) = cli.read_time {
        config.memory_timing.read = read;
    }
    if let Some(write) = cli.write_time {
        config.memory_timing.write = write;
    }
    if let Some(burst) = cli.burst_time {
        config.memory_timing.burst = burst;
        config.memory_timing.burst_enable = true;
    }
    if cli.cycle_limit.is_some() {
        config.cycle_limit = cli.cycle_limit;
    }
    config.normalize();
    config.validate().map_err(SimError::from)?;
    Ok(config)
}

fn trace_options(cli: &Cli) -> Result<TraceOptions, CliError> {
    let mut options = TraceOptions {
        fetch: cli.trace_fetch,
        decode: cli.trace_decode,
        execute: cli.trace_execute,
        memory: cli.trace_memory,
        writeback: cli.trace_writeback,
        pc: cli.trace_pc,
        hi: cli.trace_hi,
        lo: cli.trace_lo,
        mem_read: cli.trace_rdmem,
        mem_write: cli.trace_wrmem,
        ..TraceOptions::default()
    };
    for reg in &cli.trace_gp {
        if reg == "*" {
            options.trace_all_gp();
            continue;
        }
        let idx = parse_number(reg)?;
        let idx = u8::try_from(idx)
            .ok()
            .filter(|&i| i < 32)
            .ok_or_else(|| CliError::Argument {
                what: "register",
                value: reg.clone(),
            })?;
        options.trace_gp(idx);
    }
    Ok(options)
}

/// Runs the image and returns the process exit status.
fn run(cli: &Cli) -> Result<i32, CliError> {
    let mut config = machine_config(cli)?;
    let raw_base = Address::new(cli.load_address.unwrap_or(config.reset_pc));
    let program = ProgramImage::from_file(&cli.image, raw_base)?;
    if let Some(entry) = program.entry {
        config.reset_pc = entry.val();
    }

    let buffered = BufferedSerial::new();
    if let Some(path) = &cli.serial_in {
        buffered.push_input(&std::fs::read(path)?);
    }
    let host: Box<dyn SerialHost> = if cli.serial_in.is_some() || cli.serial_out.is_some() {
        Box::new(buffered.clone())
    } else {
        Box::new(StdoutSerial::stdout())
    };

    let mut sim = Simulator::new(&config, host)?;
    let loaded = sim.load_program(&program);
    info!(
        image = %cli.image.display(),
        bytes = loaded,
        elf = program.entry.is_some(),
        "image loaded"
    );
    for (start, path) in &cli.load_range {
        let _ = sim.load_file(path, Address::new(*start))?;
    }

    let tracer = Tracer::new(trace_options(cli)?);
    if !tracer.options().is_empty() {
        sim.on_step(move |state| {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            if let Err(e) = tracer.write_cycle(state, &mut lock) {
                error!(%e, "trace output failed");
            }
        });
    }

    let outcome = sim.run(None);
    let mut stdout = io::stdout();
    let code = match outcome {
        StepOutcome::ExceptionStop(ExceptionCause::Break) if !cli.expect_fail => 0,
        StepOutcome::ExceptionStop(ExceptionCause::Break) => {
            writeln!(stdout, "Machine was expected to fail but it didn't.")?;
            1
        }
        StepOutcome::ExceptionStop(cause) | StepOutcome::Trapped(cause) => {
            writeln!(stdout, "Machine stopped on {} exception.", cause.name())?;
            if cli.expect_fail { 0 } else { 1 }
        }
        StepOutcome::CycleLimit => {
            writeln!(stdout, "Specified cycle limit reached")?;
            if cli.cycle_limit_ok { 0 } else { 2 }
        }
        StepOutcome::Continue => 0,
    };

    let reporter = Reporter::new(ReportOptions {
        registers: cli.dump_registers,
        cache_stats: cli.dump_cache_stats,
        cycles: cli.dump_cycles,
        dump_ranges: cli.dump_range.clone(),
        json: cli.dump_json.clone(),
    });
    if !reporter.is_empty() {
        reporter.report(&mut sim, &mut stdout)?;
    }
    if cli.dump_stats {
        sim.cpu.stats.print();
    }

    if let Some(path) = &cli.serial_out {
        std::fs::write(path, buffered.take_output())?;
    } else if cli.serial_in.is_some() {
        stdout.write_all(&buffered.take_output())?;
    }
    stdout.flush()?;
    Ok(code)
}
