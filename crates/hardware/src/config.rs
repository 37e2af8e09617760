//! Configuration system for the MIPS32 simulator.
//!
//! This module defines the configuration structures and enums used to parameterize a
//! machine. It provides:
//! 1. **Defaults:** Baseline constants for memory timing, the memory map and the reset PC.
//! 2. **Structures:** `MachineConfig` with nested cache, timing and exception-policy sections.
//! 3. **Enums:** Hazard unit, branch resolution stage, cache replacement and write policies.
//! 4. **Parsing:** JSON loading and the compact `policy,sets,blocksize,assoc[,wp]` cache syntax.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::common::constants;
use crate::common::error::{ConfigError, ExceptionCause, SimError};

/// Default configuration constants for the simulator.
mod defaults {
    /// Main memory read latency in cycles.
    pub const READ_TIME: u32 = 10;

    /// Main memory write latency in cycles.
    pub const WRITE_TIME: u32 = 10;

    /// Latency of each additional word in a burst transfer.
    pub const BURST_TIME: u32 = 0;

    /// Level-2 cache access latency in cycles.
    pub const LEVEL2_TIME: u32 = 2;

    /// Default cache geometry component (sets, words per line, ways).
    pub const CACHE_GEOMETRY: u32 = 1;
}

/// Hazard resolution strategy of the pipelined core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardUnit {
    /// No detection; dependent instructions read stale values.
    None,
    /// Stall decode until the producer has written the register file.
    Stall,
    /// Forward from later stages; stall only on load-use.
    #[default]
    Forward,
}

impl FromStr for HazardUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "stall" => Ok(Self::Stall),
            "forward" | "stall-forward" => Ok(Self::Forward),
            other => Err(ConfigError::HazardUnit(other.to_string())),
        }
    }
}

/// Pipeline stage in which branch outcomes are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStage {
    /// Resolve in execute; at most one wrong-path instruction is fetched.
    #[default]
    Execute,
    /// Resolve in memory; up to two wrong-path instructions are fetched.
    Memory,
}

/// Cache replacement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplacementPolicy {
    /// Pseudo-random way.
    #[default]
    Random,
    /// Least recently used way.
    Lru,
    /// Least frequently used way.
    Lfu,
}

/// Cache write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WritePolicy {
    /// Write-back with allocate on write miss.
    #[serde(rename = "wb")]
    WriteBack,
    /// Write-through with allocate on write miss.
    #[serde(rename = "wta")]
    WriteThroughAlloc,
    /// Write-through without allocate; write misses bypass the cache.
    #[default]
    #[serde(rename = "wtna", alias = "wt")]
    WriteThroughNoAlloc,
}

impl WritePolicy {
    /// Returns `true` for both write-through variants.
    pub const fn is_write_through(self) -> bool {
        !matches!(self, Self::WriteBack)
    }
}

/// Configuration of one cache level.
///
/// Immutable once a `Cache` has been built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable this cache level; a disabled cache passes every access through.
    #[serde(default)]
    pub enabled: bool,

    /// Number of sets (rows).
    #[serde(default = "CacheConfig::default_geometry")]
    pub sets: u32,

    /// Words per cache line.
    #[serde(default = "CacheConfig::default_geometry")]
    pub blocks: u32,

    /// Number of ways per set.
    #[serde(default = "CacheConfig::default_geometry")]
    pub associativity: u32,

    /// Replacement policy.
    #[serde(default)]
    pub replacement: ReplacementPolicy,

    /// Write policy.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl CacheConfig {
    fn default_geometry() -> u32 {
        defaults::CACHE_GEOMETRY
    }

    /// Creates an enabled cache configuration. Zero geometry components are clamped to 1.
    ///
    /// # Arguments
    ///
    /// * `sets` - Number of sets.
    /// * `blocks` - Words per line.
    /// * `associativity` - Ways per set.
    /// * `replacement` - Victim selection policy.
    /// * `write_policy` - Write handling policy.
    pub fn new(
        sets: u32,
        blocks: u32,
        associativity: u32,
        replacement: ReplacementPolicy,
        write_policy: WritePolicy,
    ) -> Self {
        Self {
            enabled: true,
            sets,
            blocks,
            associativity,
            replacement,
            write_policy,
        }
        .normalized()
    }

    /// Returns a copy with every geometry component at least 1.
    pub fn normalized(mut self) -> Self {
        self.sets = self.sets.max(1);
        self.blocks = self.blocks.max(1);
        self.associativity = self.associativity.max(1);
        self
    }

    /// Total number of cache lines.
    pub fn line_count(&self) -> usize {
        self.sets as usize * self.associativity as usize
    }

    /// Checks that the geometry addresses less than the full 32-bit space.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let words = u64::from(self.sets) * u64::from(self.blocks) * u64::from(self.associativity);
        if self.enabled && words > (1 << 30) {
            return Err(ConfigError::Geometry {
                sets: self.sets,
                blocks: self.blocks,
                ways: self.associativity,
            });
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sets: defaults::CACHE_GEOMETRY,
            blocks: defaults::CACHE_GEOMETRY,
            associativity: defaults::CACHE_GEOMETRY,
            replacement: ReplacementPolicy::default(),
            write_policy: WritePolicy::default(),
        }
    }
}

/// Parses `policy,sets,blocksize,assoc[,wb|wt|wtna|wta]`.
impl FromStr for CacheConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pieces: Vec<&str> = s.split(',').map(str::trim).collect();
        if pieces.len() < 4 || pieces.len() > 5 {
            return Err(ConfigError::CacheFieldCount(s.to_string()));
        }

        let replacement = match pieces[0].to_ascii_lowercase().as_str() {
            "random" => ReplacementPolicy::Random,
            "lru" => ReplacementPolicy::Lru,
            "lfu" => ReplacementPolicy::Lfu,
            other => return Err(ConfigError::ReplacementPolicy(other.to_string())),
        };

        let number = |field: &'static str, text: &str| -> Result<u32, ConfigError> {
            match text.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(ConfigError::Number {
                    field,
                    value: text.to_string(),
                }),
            }
        };
        let sets = number("sets", pieces[1])?;
        let blocks = number("block size", pieces[2])?;
        let associativity = number("associativity", pieces[3])?;

        let write_policy = match pieces.get(4).map(|p| p.to_ascii_lowercase()) {
            None => WritePolicy::default(),
            Some(p) => match p.as_str() {
                "wb" => WritePolicy::WriteBack,
                "wt" | "wtna" => WritePolicy::WriteThroughNoAlloc,
                "wta" => WritePolicy::WriteThroughAlloc,
                other => return Err(ConfigError::WritePolicy(other.to_string())),
            },
        };

        let config = Self::new(sets, blocks, associativity, replacement, write_policy);
        config.validate()?;
        Ok(config)
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.enabled {
            return f.write_str("disabled");
        }
        let policy = match self.replacement {
            ReplacementPolicy::Random => "random",
            ReplacementPolicy::Lru => "lru",
            ReplacementPolicy::Lfu => "lfu",
        };
        let write = match self.write_policy {
            WritePolicy::WriteBack => "wb",
            WritePolicy::WriteThroughAlloc => "wta",
            WritePolicy::WriteThroughNoAlloc => "wtna",
        };
        write!(
            f,
            "{policy},{},{},{},{write}",
            self.sets, self.blocks, self.associativity
        )
    }
}

/// Main memory access latencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTiming {
    /// Cycles for one word read from main memory.
    #[serde(default = "MemoryTiming::default_read")]
    pub read: u32,

    /// Cycles for one word written to main memory.
    #[serde(default = "MemoryTiming::default_write")]
    pub write: u32,

    /// Cycles for each subsequent word of a burst.
    #[serde(default = "MemoryTiming::default_burst")]
    pub burst: u32,

    /// Cycles for a level-2 cache access.
    #[serde(default = "MemoryTiming::default_level2")]
    pub level2: u32,

    /// Account for burst transfers when refilling lines.
    #[serde(default)]
    pub burst_enable: bool,
}

impl MemoryTiming {
    fn default_read() -> u32 {
        defaults::READ_TIME
    }

    fn default_write() -> u32 {
        defaults::WRITE_TIME
    }

    fn default_burst() -> u32 {
        defaults::BURST_TIME
    }

    fn default_level2() -> u32 {
        defaults::LEVEL2_TIME
    }
}

impl Default for MemoryTiming {
    fn default() -> Self {
        Self {
            read: defaults::READ_TIME,
            write: defaults::WRITE_TIME,
            burst: defaults::BURST_TIME,
            level2: defaults::LEVEL2_TIME,
            burst_enable: false,
        }
    }
}

/// Per-cause `stop_on_exception` / `step_over_exception` tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionPolicy {
    /// Report a stop to the host when the cause commits.
    stop_on_exception: [bool; ExceptionCause::COUNT],
    /// Retire the faulting instruction as a no-op and keep running.
    step_over_exception: [bool; ExceptionCause::COUNT],
}

impl ExceptionPolicy {
    /// Whether committing `cause` stops the host run loop.
    pub const fn stop_on(&self, cause: ExceptionCause) -> bool {
        self.stop_on_exception[cause.index()]
    }

    /// Whether committing `cause` is stepped over instead of halting the core.
    pub const fn step_over(&self, cause: ExceptionCause) -> bool {
        self.step_over_exception[cause.index()]
    }

    /// Sets the stop flag for one cause.
    pub fn set_stop_on(&mut self, cause: ExceptionCause, value: bool) {
        self.stop_on_exception[cause.index()] = value;
    }

    /// Sets the step-over flag for one cause.
    pub fn set_step_over(&mut self, cause: ExceptionCause, value: bool) {
        self.step_over_exception[cause.index()] = value;
    }
}

impl Default for ExceptionPolicy {
    fn default() -> Self {
        let mut step_over_exception = [true; ExceptionCause::COUNT];
        step_over_exception[ExceptionCause::Interrupt.index()] = false;
        Self {
            stop_on_exception: [true; ExceptionCause::COUNT],
            step_over_exception,
        }
    }
}

/// Root machine configuration.
///
/// Built with `MachineConfig::default()` or deserialized from JSON; missing fields take
/// the defaults in this module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Five-stage pipeline instead of the single-cycle core.
    #[serde(default)]
    pub pipelined: bool,

    /// Execute the instruction after a branch/jump unconditionally.
    #[serde(default = "MachineConfig::default_delay_slot")]
    pub delay_slot: bool,

    /// Data hazard handling of the pipelined core.
    #[serde(default)]
    pub hazard_unit: HazardUnit,

    /// Stage in which the pipelined core resolves branches.
    #[serde(default)]
    pub branch_stage: BranchStage,

    /// Program counter after reset.
    #[serde(default = "MachineConfig::default_reset_pc")]
    pub reset_pc: u64,

    /// Main memory latencies.
    #[serde(default)]
    pub memory_timing: MemoryTiming,

    /// Level-1 program cache.
    #[serde(default)]
    pub cache_program: CacheConfig,

    /// Level-1 data cache.
    #[serde(default)]
    pub cache_data: CacheConfig,

    /// Unified level-2 cache.
    #[serde(default)]
    pub cache_level2: CacheConfig,

    /// Stop after this many cycles.
    #[serde(default)]
    pub cycle_limit: Option<u64>,

    /// IRQ levels that interrupt the core (bit per level).
    #[serde(default)]
    pub interrupt_mask: u32,

    /// Per-cause exception handling.
    #[serde(default)]
    pub exceptions: ExceptionPolicy,

    /// Base address of the serial port.
    #[serde(default = "MachineConfig::default_serial_port_base")]
    pub serial_port_base: u64,

    /// Base address of the LED/knob controller.
    #[serde(default = "MachineConfig::default_spi_led_base")]
    pub spi_led_base: u64,
}

impl MachineConfig {
    const fn default_delay_slot() -> bool {
        true
    }

    const fn default_reset_pc() -> u64 {
        constants::DEFAULT_RESET_PC
    }

    const fn default_serial_port_base() -> u64 {
        constants::SERIAL_PORT_BASE
    }

    const fn default_spi_led_base() -> u64 {
        constants::SPI_LED_BASE
    }

    /// Parses a JSON configuration and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Clamps cache geometry the same way `CacheConfig::new` does.
    pub fn normalize(&mut self) {
        self.cache_program = self.cache_program.normalized();
        self.cache_data = self.cache_data.normalized();
        self.cache_level2 = self.cache_level2.normalized();
    }

    /// Rejects configurations the machine cannot be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache_program.validate()?;
        self.cache_data.validate()?;
        self.cache_level2.validate()
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            pipelined: false,
            delay_slot: true,
            hazard_unit: HazardUnit::default(),
            branch_stage: BranchStage::default(),
            reset_pc: constants::DEFAULT_RESET_PC,
            memory_timing: MemoryTiming::default(),
            cache_program: CacheConfig::default(),
            cache_data: CacheConfig::default(),
            cache_level2: CacheConfig::default(),
            cycle_limit: None,
            interrupt_mask: 0,
            exceptions: ExceptionPolicy::default(),
            serial_port_base: constants::SERIAL_PORT_BASE,
            spi_led_base: constants::SPI_LED_BASE,
        }
    }
}
