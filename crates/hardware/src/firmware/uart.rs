//! Polled console UART driver.
//!
//! This is the firmware half of the serial link. It implements:
//! 1. **Register map:** Offsets and status bits relative to the UART base.
//! 2. **Initialization:** Reads the core clock from SysCon and programs the divisor.
//! 3. **Character I/O:** Busy-polling `getchar`/`putchar` plus single-poll variants
//!    for callers that must not spin (a firmware stepped once per clock edge).
//!
//! There are no interrupts and no buffering beyond the one-byte holding
//! registers. The driver never assumes the host is ready; it spins.

use crate::soc::devices::syscon::SYS_REG_CLKINFO;

/// TX data register (write).
pub const TX_DATA: u64 = 0x00;
/// RX data register (read).
pub const RX_DATA: u64 = 0x08;
/// Status register (read).
pub const STATUS: u64 = 0x10;
/// Clock divisor register.
pub const CLOCK_DIV: u64 = 0x18;
/// IRQ enable register.
pub const IRQ_EN: u64 = 0x20;

/// Status: receive holding register empty.
pub const STATUS_RX_EMPTY: u64 = 0x01;
/// Status: transmit holding register empty.
pub const STATUS_TX_EMPTY: u64 = 0x02;
/// Status: receive holding register full.
pub const STATUS_RX_FULL: u64 = 0x04;
/// Status: transmit holding register full.
pub const STATUS_TX_FULL: u64 = 0x08;

/// Size of the UART register window.
pub const UART_WINDOW: u64 = 0x40;

/// Oversampling factor between the UART clock and the baud rate.
const OVERSAMPLE: u64 = 16;

/// Volatile 64-bit access to physical addresses, as seen by firmware.
pub trait Mmio {
    /// Loads the double-word at `addr`.
    fn read_u64(&mut self, addr: u64) -> u64;

    /// Stores `val` to the double-word at `addr`.
    fn write_u64(&mut self, addr: u64, val: u64);
}

/// Clock divisor for a given core clock and baud rate:
/// `proc_freq / (uart_freq * 16) - 1`.
///
/// The subtraction wraps like the unsigned arithmetic on the device.
///
/// # Panics
///
/// Panics if `uart_freq` is zero. [`Config::validate`](crate::config::Config::validate)
/// rejects such configurations.
pub const fn divisor(proc_freq: u64, uart_freq: u64) -> u64 {
    (proc_freq / (uart_freq * OVERSAMPLE)).wrapping_sub(1)
}

/// Console driver bound to a bus and a UART base address.
#[derive(Debug)]
pub struct UartDriver<'a, B: Mmio + ?Sized> {
    bus: &'a mut B,
    base: u64,
}

impl<'a, B: Mmio + ?Sized> UartDriver<'a, B> {
    /// Binds the driver to the UART at `base`.
    pub fn new(bus: &'a mut B, base: u64) -> Self {
        Self { bus, base }
    }

    fn reg_read(&mut self, offset: u64) -> u64 {
        self.bus.read_u64(self.base + offset)
    }

    fn reg_write(&mut self, offset: u64, val: u64) {
        self.bus.write_u64(self.base + offset, val);
    }

    /// Reads the core clock from SysCon's `CLKINFO` and programs the divisor
    /// for `uart_freq`. Returns `(proc_freq, divisor)`.
    pub fn init(&mut self, syscon_base: u64, uart_freq: u64) -> (u64, u64) {
        let proc_freq = self.bus.read_u64(syscon_base + SYS_REG_CLKINFO);
        let div = divisor(proc_freq, uart_freq);
        self.reg_write(CLOCK_DIV, div);
        (proc_freq, div)
    }

    /// Polls the status register once for `RX empty`.
    pub fn rx_empty(&mut self) -> bool {
        self.reg_read(STATUS) & STATUS_RX_EMPTY != 0
    }

    /// Polls the status register once for `TX full`.
    pub fn tx_full(&mut self) -> bool {
        self.reg_read(STATUS) & STATUS_TX_FULL != 0
    }

    /// Reads the RX data register, masked to 8 bits.
    pub fn read(&mut self) -> u8 {
        (self.reg_read(RX_DATA) & 0xFF) as u8
    }

    /// Writes the TX data register.
    pub fn write(&mut self, c: u8) {
        self.reg_write(TX_DATA, u64::from(c));
    }

    /// One poll iteration of `getchar`: returns the byte if RX is not empty.
    pub fn try_getchar(&mut self) -> Option<u8> {
        if self.rx_empty() { None } else { Some(self.read()) }
    }

    /// One poll iteration of `putchar`: writes `c` unless TX is full.
    pub fn try_putchar(&mut self, c: u8) -> bool {
        if self.tx_full() {
            return false;
        }
        self.write(c);
        true
    }

    /// Spins until a byte arrives, then returns it.
    pub fn getchar(&mut self) -> u8 {
        loop {
            if let Some(c) = self.try_getchar() {
                return c;
            }
            std::hint::spin_loop();
        }
    }

    /// Spins until TX has room, then writes `c`.
    pub fn putchar(&mut self, c: u8) {
        while !self.try_putchar(c) {
            std::hint::spin_loop();
        }
    }

    /// Writes every byte of `data`.
    pub fn putstr(&mut self, data: &[u8]) {
        for &c in data {
            self.putchar(c);
        }
    }

    /// Writes a string.
    pub fn puts(&mut self, s: &str) {
        self.putstr(s.as_bytes());
    }
}
