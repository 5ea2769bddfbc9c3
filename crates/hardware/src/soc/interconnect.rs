//! System interconnect (bus) for MMIO access.
//!
//! This module implements the bus that routes physical address accesses to devices. It provides:
//! 1. **Device registration:** Devices are added by address range and sorted for lookup.
//! 2. **Access routing:** Read/write by address with a last-device hint.
//! 3. **UART access:** Direct handle on the console UART for the core's serial pins.

use super::devices::{Device, PotatoUart};
use crate::firmware::uart::Mmio;

/// System bus connecting the core and devices; routes accesses by physical address.
pub struct Bus {
    /// Registered MMIO devices, sorted by base address.
    devices: Vec<Box<dyn Device + Send>>,
    last_device_idx: usize,
    uart_idx: Option<usize>,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field(
                "devices",
                &self.devices.iter().map(|d| d.name()).collect::<Vec<_>>(),
            )
            .field("uart_idx", &self.uart_idx)
            .finish()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Creates an empty bus; add devices with `add_device`.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            last_device_idx: 0,
            uart_idx: None,
        }
    }

    /// Registers a device on the bus; devices are sorted by base address for lookup.
    pub fn add_device(&mut self, dev: Box<dyn Device + Send>) {
        self.devices.push(dev);
        self.devices.sort_by_key(|d| d.address_range().0);
        self.uart_idx = self.devices.iter().position(|d| d.name() == "UART0");
        self.last_device_idx = 0;
    }

    /// Returns the console UART, if one is registered.
    pub fn uart_mut(&mut self) -> Option<&mut PotatoUart> {
        let idx = self.uart_idx?;
        self.devices[idx].as_uart_mut()
    }

    /// Finds the device covering `paddr` and the offset into it.
    fn find_device(&mut self, paddr: u64) -> Option<(&mut Box<dyn Device + Send>, u64)> {
        let hint = self.last_device_idx;
        if let Some(dev) = self.devices.get(hint) {
            let (start, size) = dev.address_range();
            if paddr >= start && paddr - start < size {
                return Some((&mut self.devices[hint], paddr - start));
            }
        }
        let idx = self.devices.iter().position(|dev| {
            let (start, size) = dev.address_range();
            paddr >= start && paddr - start < size
        })?;
        self.last_device_idx = idx;
        let start = self.devices[idx].address_range().0;
        Some((&mut self.devices[idx], paddr - start))
    }

    /// Reads a double-word; unmapped addresses read as zero.
    pub fn read_u64(&mut self, paddr: u64) -> u64 {
        if let Some((dev, offset)) = self.find_device(paddr) {
            dev.read_u64(offset)
        } else {
            tracing::warn!("read from unmapped address {paddr:#x}");
            0
        }
    }

    /// Writes a double-word; writes to unmapped addresses are dropped.
    pub fn write_u64(&mut self, paddr: u64, val: u64) {
        if let Some((dev, offset)) = self.find_device(paddr) {
            dev.write_u64(offset, val);
        } else {
            tracing::warn!("write to unmapped address {paddr:#x}");
        }
    }
}

impl Mmio for Bus {
    fn read_u64(&mut self, addr: u64) -> u64 {
        Bus::read_u64(self, addr)
    }

    fn write_u64(&mut self, addr: u64, val: u64) {
        Bus::write_u64(self, addr, val);
    }
}
