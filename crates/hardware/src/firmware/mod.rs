//! Firmware running inside the reference core.
//!
//! The console driver here is the device-side half of the serial link. Its
//! register protocol must match the host-side bridge bit for bit, so the
//! register map lives with the driver and the UART device imports it.

/// Reference echo program, stepped once per rising clock edge.
pub mod echo;

/// Polled console UART driver and register map.
pub mod uart;

pub use echo::EchoFirmware;
pub use uart::{Mmio, UartDriver, divisor};
