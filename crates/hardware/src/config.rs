//! Configuration system for the co-simulation driver.
//!
//! This module defines all configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline memory map, clocking and firmware constants.
//! 2. **Structures:** Hierarchical config for general, trace, UART, SysCon and firmware settings.
//! 3. **Loading:** JSON deserialization and validation.
//!
//! Every field has a default, so an empty JSON object (`{}`) is a complete configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::common::error::ConfigError;
use crate::firmware::uart::UART_WINDOW;
use crate::soc::devices::syscon::SYSCON_WINDOW;

/// Default configuration constants for the driver.
///
/// These values define the baseline memory map and clocking when not
/// explicitly overridden in a JSON configuration file.
mod defaults {
    /// Base address of the console UART register window.
    pub const UART_BASE: u64 = 0xC000_2000;

    /// Console baud rate.
    pub const UART_BAUD: u64 = 115_200;

    /// Base address of the system control registers.
    pub const SYSCON_BASE: u64 = 0xC000_0000;

    /// Core clock frequency reported through `CLKINFO` (50 MHz).
    pub const CLOCK_HZ: u64 = 50_000_000;

    /// Default waveform file name.
    pub const TRACE_PATH: &str = "core.vcd";

    /// Default top-level VCD scope.
    pub const TRACE_SCOPE: &str = "core";

    /// Default VCD timescale in nanoseconds per cycle-counter tick.
    pub const TRACE_TIMESCALE_NS: u32 = 1;

    /// Banner printed by the echo firmware after UART init.
    pub const BANNER: &str = "Hello from wattsim, an OpenPOWER co-simulation!\r\n";

    /// Prompt printed by the echo firmware.
    pub const PROMPT: &str = "> ";

    /// Byte that makes the echo firmware power the system off (Ctrl-D).
    pub const HALT_BYTE: u8 = 0x04;
}

/// Root configuration for a simulation run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General run settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Waveform trace settings.
    #[serde(default)]
    pub trace: TraceConfig,
    /// Console UART settings.
    #[serde(default)]
    pub uart: UartConfig,
    /// System controller settings.
    #[serde(default)]
    pub syscon: SysConConfig,
    /// Reference echo firmware settings.
    #[serde(default)]
    pub firmware: FirmwareConfig,
}

impl Config {
    /// Parses and validates a configuration from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::ZeroBaud`] if `uart.baud` is zero.
    /// * [`ConfigError::ClockTooSlow`] if the divisor formula would underflow.
    /// * [`ConfigError::OverlappingDevices`] if the UART and SysCon windows intersect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.uart.baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        if self.syscon.clock_hz / 16 < self.uart.baud {
            return Err(ConfigError::ClockTooSlow {
                clock_hz: self.syscon.clock_hz,
                baud: self.uart.baud,
            });
        }
        let uart = self.uart.base..self.uart.base.saturating_add(UART_WINDOW);
        let syscon = self.syscon.base..self.syscon.base.saturating_add(SYSCON_WINDOW);
        if uart.start < syscon.end && syscon.start < uart.end {
            return Err(ConfigError::OverlappingDevices {
                uart: self.uart.base,
                syscon: self.syscon.base,
            });
        }
        Ok(())
    }
}

/// General run settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Stop after this many full cycles (reset cycles included). `None` runs until
    /// termination or interruption.
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

/// Waveform trace settings. Tracing is a static choice made before the first phase.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceConfig {
    /// Record a VCD trace of every phase.
    #[serde(default)]
    pub enabled: bool,

    /// Output VCD path.
    #[serde(default = "TraceConfig::default_path")]
    pub path: PathBuf,

    /// Name of the top-level VCD scope.
    #[serde(default = "TraceConfig::default_scope")]
    pub scope: String,

    /// Nanoseconds per cycle-counter tick written to the VCD header.
    #[serde(default = "TraceConfig::default_timescale_ns")]
    pub timescale_ns: u32,
}

impl TraceConfig {
    fn default_path() -> PathBuf {
        PathBuf::from(defaults::TRACE_PATH)
    }

    fn default_scope() -> String {
        defaults::TRACE_SCOPE.to_string()
    }

    fn default_timescale_ns() -> u32 {
        defaults::TRACE_TIMESCALE_NS
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: Self::default_path(),
            scope: Self::default_scope(),
            timescale_ns: defaults::TRACE_TIMESCALE_NS,
        }
    }
}

/// Console UART settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UartConfig {
    /// UART MMIO base address.
    #[serde(default = "UartConfig::default_base")]
    pub base: u64,

    /// Target baud rate used by the firmware divisor computation.
    #[serde(default = "UartConfig::default_baud")]
    pub baud: u64,
}

impl UartConfig {
    fn default_base() -> u64 {
        defaults::UART_BASE
    }

    fn default_baud() -> u64 {
        defaults::UART_BAUD
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            base: defaults::UART_BASE,
            baud: defaults::UART_BAUD,
        }
    }
}

/// System controller settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SysConConfig {
    /// SysCon MMIO base address.
    #[serde(default = "SysConConfig::default_base")]
    pub base: u64,

    /// Core clock frequency in Hz, readable through `CLKINFO`.
    #[serde(default = "SysConConfig::default_clock_hz")]
    pub clock_hz: u64,
}

impl SysConConfig {
    fn default_base() -> u64 {
        defaults::SYSCON_BASE
    }

    fn default_clock_hz() -> u64 {
        defaults::CLOCK_HZ
    }
}

impl Default for SysConConfig {
    fn default() -> Self {
        Self {
            base: defaults::SYSCON_BASE,
            clock_hz: defaults::CLOCK_HZ,
        }
    }
}

/// Settings for the reference echo firmware.
#[derive(Debug, Clone, Deserialize)]
pub struct FirmwareConfig {
    /// Text written once after UART initialization.
    #[serde(default = "FirmwareConfig::default_banner")]
    pub banner: String,

    /// Prompt written after the banner and after every carriage return.
    #[serde(default = "FirmwareConfig::default_prompt")]
    pub prompt: String,

    /// Receiving this byte powers the system off through SysCon.
    #[serde(default = "FirmwareConfig::default_halt_byte")]
    pub halt_byte: u8,
}

impl FirmwareConfig {
    fn default_banner() -> String {
        defaults::BANNER.to_string()
    }

    fn default_prompt() -> String {
        defaults::PROMPT.to_string()
    }

    fn default_halt_byte() -> u8 {
        defaults::HALT_BYTE
    }
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            banner: Self::default_banner(),
            prompt: Self::default_prompt(),
            halt_byte: defaults::HALT_BYTE,
        }
    }
}
