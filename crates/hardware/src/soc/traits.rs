//! System-on-Chip Traits.
//!
//! This module defines the common interface implemented by memory-mapped
//! devices so the bus can route accesses to them uniformly.

use crate::soc::devices::PotatoUart;

/// Trait for memory-mapped I/O devices.
///
/// Registers in this SoC are 64 bits wide and 8-byte aligned, so devices only
/// expose double-word accesses.
pub trait Device {
    /// Returns the user-friendly name of the device.
    ///
    /// Used for debugging and logging purposes.
    fn name(&self) -> &str;

    /// Returns the address range (Base Address, Size) of the device.
    ///
    /// Used by the system bus to route memory accesses to the correct device.
    fn address_range(&self) -> (u64, u64);

    /// Reads a double-word (64-bit) register at the specified offset.
    fn read_u64(&mut self, offset: u64) -> u64;

    /// Writes a double-word (64-bit) register at the specified offset.
    fn write_u64(&mut self, offset: u64, val: u64);

    /// Downcasts the device to a mutable UART reference if applicable.
    ///
    /// Used by the core to reach the UART's serial pins.
    fn as_uart_mut(&mut self) -> Option<&mut PotatoUart> {
        None
    }
}
