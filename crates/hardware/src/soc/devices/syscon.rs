//! System Controller (SysCon).
//!
//! A simple memory-mapped device that reports the core clock to firmware and
//! lets firmware end the simulation.
//!
//! # Registers
//!
//! * `0x00`: Command Register (Write Only)
//!   * `0x5555`: Power Off
//!   * `0x7777`: Reset
//!   * `0x3333`: Failure/Panic
//! * `0x20`: `CLKINFO`, core clock frequency in Hz (Read Only)

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::soc::devices::Device;

/// Size of the SysCon register window.
pub const SYSCON_WINDOW: u64 = 0x1000;

/// Command register offset.
pub const SYS_REG_CONTROL: u64 = 0x00;

/// Clock information register offset.
pub const SYS_REG_CLKINFO: u64 = 0x20;

/// Command: power off with exit code 0.
pub const CMD_POWEROFF: u64 = 0x5555;

/// Command: reset, simulated as exit code 0.
pub const CMD_RESET: u64 = 0x7777;

/// Command: failure, exit code 1.
pub const CMD_FAILURE: u64 = 0x3333;

/// Value of the exit signal while no exit has been requested.
pub const NO_EXIT: u64 = u64::MAX;

/// SysCon device structure.
#[derive(Debug)]
pub struct SysCon {
    /// Base physical address of the device.
    base_addr: u64,
    /// Core clock frequency reported through `CLKINFO`.
    clock_hz: u64,
    /// Shared flag holding the requested exit code, or [`NO_EXIT`].
    exit_signal: Arc<AtomicU64>,
}

impl SysCon {
    /// Creates a new SysCon device.
    ///
    /// # Arguments
    ///
    /// * `base_addr` - The base physical address.
    /// * `clock_hz` - Core clock frequency reported to firmware.
    /// * `exit_signal` - Shared atomic for signaling exit codes.
    pub fn new(base_addr: u64, clock_hz: u64, exit_signal: Arc<AtomicU64>) -> Self {
        Self {
            base_addr,
            clock_hz,
            exit_signal,
        }
    }
}

impl Device for SysCon {
    fn name(&self) -> &str {
        "SysCon"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, SYSCON_WINDOW)
    }

    fn read_u64(&mut self, offset: u64) -> u64 {
        match offset {
            SYS_REG_CLKINFO => self.clock_hz,
            _ => 0,
        }
    }

    /// Interprets specific magic values written to the command register.
    fn write_u64(&mut self, offset: u64, val: u64) {
        if offset != SYS_REG_CONTROL {
            return;
        }
        match val & 0xFFFF_FFFF {
            CMD_POWEROFF => {
                tracing::info!("SysCon: poweroff signal received");
                self.exit_signal.store(0, Ordering::Relaxed);
            }
            CMD_RESET => {
                tracing::info!("SysCon: reset signal received (simulated as exit)");
                self.exit_signal.store(0, Ordering::Relaxed);
            }
            CMD_FAILURE => {
                tracing::info!("SysCon: failure signal received");
                self.exit_signal.store(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }
}
