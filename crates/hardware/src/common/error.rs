//! Driver and configuration error definitions.
//!
//! The clock loop itself has no recoverable error taxonomy: model evaluation is
//! total and an empty host source is ordinary flow control. What remains are
//! the fatal startup conditions (trace file, configuration) and host I/O
//! failures that end the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The waveform trace could not be created before the first phase.
    #[error("failed to open trace file '{}': {source}", .path.display())]
    TraceOpen {
        /// Requested trace path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Writing or closing the waveform trace failed.
    #[error("trace write failed: {0}")]
    TraceWrite(#[source] io::Error),

    /// The host side of the serial link failed.
    #[error("host serial I/O failed: {0}")]
    HostIo(#[source] io::Error),

    /// The register dump could not be written.
    #[error("register dump failed: {0}")]
    Dump(#[source] io::Error),

    /// Interrupt handling could not be installed.
    #[error("failed to install interrupt watcher: {0}")]
    Signal(#[source] io::Error),

    /// Invalid or unreadable configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config '{}': {source}", .path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid JSON for [`Config`](crate::config::Config).
    #[error("could not parse config '{}': {source}", .path.display())]
    Parse {
        /// Config file path (`<inline>` for string input).
        path: PathBuf,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },

    /// The UART baud rate is zero.
    #[error("uart.baud must be non-zero")]
    ZeroBaud,

    /// The core clock cannot produce the requested baud rate with a 16x oversampling divisor.
    #[error("syscon.clock_hz ({clock_hz}) is below 16 * uart.baud ({baud})")]
    ClockTooSlow {
        /// Configured core clock in Hz.
        clock_hz: u64,
        /// Configured baud rate.
        baud: u64,
    },

    /// The UART and SysCon register windows overlap.
    #[error("uart window {uart:#x} overlaps syscon window {syscon:#x}")]
    OverlappingDevices {
        /// UART base address.
        uart: u64,
        /// SysCon base address.
        syscon: u64,
    },
}
