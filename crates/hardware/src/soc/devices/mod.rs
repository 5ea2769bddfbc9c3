//! Memory-Mapped IO Devices.
//!
//! This module contains the devices found in the reference SoC: the console
//! UART that backs the serial pins, and the system controller.

/// System Controller (clock info, power and reset control).
pub mod syscon;

/// Console UART with one-byte holding registers.
pub mod uart;

pub use syscon::SysCon;
pub use uart::PotatoUart;

pub use crate::soc::traits::Device;
