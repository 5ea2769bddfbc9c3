//! Console UART.
//!
//! Implements the device side of the polled console protocol used by the
//! firmware driver in [`crate::firmware::uart`]. The UART has a one-byte
//! holding register in each direction and no FIFO; the serial pins of the
//! core are wired straight to those holding registers.
//!
//! # Registers
//!
//! * `0x00`: TX data (write)
//! * `0x08`: RX data (read, pops the holding register)
//! * `0x10`: Status (read): bit 0 RX empty, bit 1 TX empty, bit 2 RX full, bit 3 TX full
//! * `0x18`: Clock divisor
//! * `0x20`: IRQ enable (stored only, interrupts are never raised)

use crate::firmware::uart::{
    CLOCK_DIV, IRQ_EN, RX_DATA, STATUS, STATUS_RX_EMPTY, STATUS_RX_FULL, STATUS_TX_EMPTY,
    STATUS_TX_FULL, TX_DATA, UART_WINDOW,
};
use crate::soc::devices::Device;

/// Console UART device structure.
#[derive(Debug)]
pub struct PotatoUart {
    /// Base physical address of the device.
    base_addr: u64,
    /// Byte received from the serial pins, waiting for the firmware.
    rx: Option<u8>,
    /// Byte written by the firmware, waiting to be shifted out.
    tx: Option<u8>,
    /// Clock divisor programmed by the firmware.
    div: u64,
    /// IRQ enable register.
    irq_en: u64,
}

impl PotatoUart {
    /// Creates a UART with both holding registers empty.
    pub fn new(base_addr: u64) -> Self {
        Self {
            base_addr,
            rx: None,
            tx: None,
            div: 0,
            irq_en: 0,
        }
    }

    /// Returns the device to its reset state.
    pub fn reset(&mut self) {
        self.rx = None;
        self.tx = None;
        self.div = 0;
        self.irq_en = 0;
    }

    /// Returns `true` if the receive holding register can take a byte.
    pub fn rx_ready(&self) -> bool {
        self.rx.is_none()
    }

    /// Latches a byte from the serial-in pins.
    ///
    /// Returns `false` and leaves the holding register untouched if it is full.
    pub fn shift_in(&mut self, byte: u8) -> bool {
        if self.rx.is_some() {
            return false;
        }
        self.rx = Some(byte);
        true
    }

    /// Moves the transmit holding register onto the serial-out pins.
    pub fn shift_out(&mut self) -> Option<u8> {
        self.tx.take()
    }

    /// Returns the programmed clock divisor.
    pub fn divisor(&self) -> u64 {
        self.div
    }

    /// Computes the status register.
    fn status(&self) -> u64 {
        let mut status = 0;
        if self.rx.is_some() {
            status |= STATUS_RX_FULL;
        } else {
            status |= STATUS_RX_EMPTY;
        }
        if self.tx.is_some() {
            status |= STATUS_TX_FULL;
        } else {
            status |= STATUS_TX_EMPTY;
        }
        status
    }
}

impl Device for PotatoUart {
    fn name(&self) -> &str {
        "UART0"
    }

    fn address_range(&self) -> (u64, u64) {
        (self.base_addr, UART_WINDOW)
    }

    /// Reads a register. Reading RX data while empty returns 0.
    fn read_u64(&mut self, offset: u64) -> u64 {
        match offset {
            RX_DATA => self.rx.take().map_or(0, u64::from),
            STATUS => self.status(),
            CLOCK_DIV => self.div,
            IRQ_EN => self.irq_en,
            _ => 0,
        }
    }

    /// Writes a register. A TX write while the holding register is full is dropped,
    /// which is why the driver polls `TX full` first.
    fn write_u64(&mut self, offset: u64, val: u64) {
        match offset {
            TX_DATA => {
                if self.tx.is_none() {
                    self.tx = Some(val as u8);
                } else {
                    tracing::warn!(
                        byte = val as u8,
                        "UART TX write while holding register full"
                    );
                }
            }
            CLOCK_DIV => self.div = val,
            IRQ_EN => self.irq_en = val,
            _ => {}
        }
    }

    fn as_uart_mut(&mut self) -> Option<&mut PotatoUart> {
        Some(self)
    }
}
