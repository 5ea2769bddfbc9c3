//! Cycle-accurate co-simulation driver library.
//!
//! This crate clocks a synthesizable core model and connects it to the host:
//! 1. **Core:** The [`ClockedModel`] boundary, pin bundles, architectural state, and a reference echo core.
//! 2. **SoC:** Bus, console UART, and system controller used by the reference core.
//! 3. **Firmware:** The polled UART driver protocol and the echo program that runs on the reference core.
//! 4. **Simulation:** Two-phase clocking, VCD tracing, the UART bridge, and the termination protocol.
//! 5. **Support:** Configuration, errors, and run statistics.

/// Common constants and error types.
pub mod common;
/// Driver configuration (defaults and JSON-loadable sections).
pub mod config;
/// Core boundary (pins, model trait, architectural state, echo core).
pub mod core;
/// Firmware-side UART driver and echo program.
pub mod firmware;
/// Co-simulation driver (clock, trace, bridge, termination, simulator).
pub mod sim;
/// System-on-chip (bus, devices, traits).
pub mod soc;
/// Run statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or load it from JSON.
pub use crate::config::Config;
/// Reference core running the echo firmware.
pub use crate::core::EchoCore;
/// Stepped-model trait implemented by every simulated core.
pub use crate::core::ClockedModel;
/// Driver context; construct with `Simulator::new` or `Simulator::with_trace`.
pub use crate::sim::{RunOutcome, Simulator};
