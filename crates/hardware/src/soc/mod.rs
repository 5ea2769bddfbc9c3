//! System-on-Chip (SoC) Components.
//!
//! This module organizes the memory-mapped devices the reference core's
//! firmware talks to, and the interconnect that routes its accesses.

/// Memory-mapped I/O device implementations.
pub mod devices;

/// System bus interconnect and routing.
pub mod interconnect;

/// Device trait definitions for MMIO access.
pub mod traits;

pub use interconnect::Bus;
