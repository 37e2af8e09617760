//! Simulator: owns the CPU and the host handles to its peripherals.
//!
//! This is the entry point hosts drive. It provides:
//! 1. **Construction:** Validates configuration and assembles the board and core.
//! 2. **Stepping:** Single-cycle steps and bounded runs reporting a `StepOutcome`.
//! 3. **Observation:** `on_step` callbacks receive the `CoreState` after every cycle.
//! 4. **Loading:** Raw images and ELF segments written into the address space before the first cycle.

use std::path::Path;

use tracing::{debug, info};

use crate::common::{Address, ExceptionCause, SimError};
use crate::config::MachineConfig;
use crate::core::Cpu;
use crate::core::pipeline::state::{CoreState, CoreStatus};
use crate::sim::loader::ProgramImage;
use crate::soc::System;
use crate::soc::devices::{Backend, SerialHost, SharedBackend, SpiLed};

/// Callback invoked with the core state at the end of every cycle.
pub type StepCallback = Box<dyn FnMut(&CoreState) + Send>;

/// Result of advancing the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The core keeps running.
    Continue,
    /// A cause configured to stop the run loop was committed.
    ExceptionStop(ExceptionCause),
    /// The core is stopped on an exception that is not stepped over.
    Trapped(ExceptionCause),
    /// The configured cycle limit was reached.
    CycleLimit,
}

impl StepOutcome {
    /// Returns `true` if the run loop should stop.
    pub const fn is_stop(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// Top-level simulator.
pub struct Simulator {
    /// CPU state (registers, pipeline, caches, bus, stats).
    pub cpu: Cpu,
    serial_port: SharedBackend,
    spi_led: SharedBackend,
    observers: Vec<StepCallback>,
}

impl Simulator {
    /// Builds a simulator from `config`.
    ///
    /// # Arguments
    ///
    /// * `config` - Machine configuration; validated before anything is built.
    /// * `serial_host` - Byte source and sink behind the serial port.
    pub fn new(config: &MachineConfig, serial_host: Box<dyn SerialHost>) -> Result<Self, SimError> {
        let mut config = config.clone();
        config.normalize();
        config.validate()?;

        let system = System::new(&config, serial_host)?;
        info!(
            pipelined = config.pipelined,
            hazard_unit = ?config.hazard_unit,
            delay_slot = config.delay_slot,
            "simulator created"
        );
        Ok(Self {
            cpu: Cpu::new(system.bus, system.interrupts, &config),
            serial_port: system.serial_port,
            spi_led: system.spi_led,
            observers: Vec::new(),
        })
    }

    /// Registers a callback run at the end of every cycle.
    pub fn on_step(&mut self, callback: impl FnMut(&CoreState) + Send + 'static) {
        self.observers.push(Box::new(callback));
    }

    /// Current core state.
    pub const fn state(&self) -> &CoreState {
        &self.cpu.state
    }

    /// Configuration the simulator runs with.
    pub const fn config(&self) -> &MachineConfig {
        &self.cpu.config
    }

    /// Advances by one cycle.
    pub fn step(&mut self) -> StepOutcome {
        if !self.cpu.state.is_running() {
            return self.outcome(None);
        }
        let stop = self.cpu.step();
        for observer in &mut self.observers {
            observer(&self.cpu.state);
        }
        self.outcome(stop)
    }

    /// Steps until the core stops or `max_cycles` cycles have run.
    ///
    /// # Returns
    ///
    /// The outcome of the last cycle; `Continue` if the budget ran out first.
    pub fn run(&mut self, max_cycles: Option<u64>) -> StepOutcome {
        let mut ran = 0u64;
        loop {
            if max_cycles.is_some_and(|max| ran >= max) {
                return StepOutcome::Continue;
            }
            let outcome = self.step();
            ran += 1;
            if outcome.is_stop() {
                debug!(?outcome, cycles = self.cpu.state.cycle_count, "run stopped");
                return outcome;
            }
        }
    }

    /// Writes `bytes` into the address space starting at `addr`.
    ///
    /// Caches are flushed first so the core sees the new content.
    pub fn load_image(&mut self, addr: Address, bytes: &[u8]) {
        info!(%addr, len = bytes.len(), "loading image");
        self.cpu.mem.write_bytes(addr, bytes);
    }

    /// Reads a raw image from disk and loads it at `addr`.
    ///
    /// # Returns
    ///
    /// Number of bytes loaded.
    pub fn load_file(&mut self, path: impl AsRef<Path>, addr: Address) -> Result<usize, SimError> {
        let bytes = std::fs::read(path)?;
        self.load_image(addr, &bytes);
        Ok(bytes.len())
    }

    /// Writes every segment of `program` into the address space.
    ///
    /// The entry point is not applied here; hosts pass it as `reset_pc` when
    /// building the simulator.
    pub fn load_program(&mut self, program: &ProgramImage) -> usize {
        for segment in &program.segments {
            self.load_image(segment.addr, &segment.bytes);
        }
        program.len()
    }

    /// Returns the core to reset state; memory content is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Host handle to the serial port.
    pub const fn serial_port(&self) -> &SharedBackend {
        &self.serial_port
    }

    /// Host handle to the LED/knob controller.
    pub const fn spi_led(&self) -> &SharedBackend {
        &self.spi_led
    }

    /// Runs `f` on the LED/knob controller.
    pub fn with_spi_led<R>(&self, f: impl FnOnce(&mut SpiLed) -> R) -> Option<R> {
        let mut guard = self
            .spi_led
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match &mut *guard {
            Backend::SpiLed(dev) => Some(f(dev)),
            _ => None,
        }
    }

    fn outcome(&self, stop: Option<ExceptionCause>) -> StepOutcome {
        if let Some(cause) = stop {
            return StepOutcome::ExceptionStop(cause);
        }
        match self.cpu.state.status {
            CoreStatus::Running => StepOutcome::Continue,
            CoreStatus::Trapped(cause) => StepOutcome::Trapped(cause),
            CoreStatus::Halted => StepOutcome::CycleLimit,
        }
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("cpu", &self.cpu)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
