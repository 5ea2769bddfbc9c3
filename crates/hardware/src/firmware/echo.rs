//! Reference echo program.
//!
//! The program initializes the console, prints a banner and a prompt, then
//! echoes every received byte. A carriage return is answered with `"\r\n"`
//! followed by a fresh prompt. The configured halt byte powers the system off
//! through SysCon.
//!
//! A real core would run this as a blocking loop. Here the program is a step
//! machine advanced once per rising clock edge, and every step performs at
//! most one poll iteration of the driver, so a busy UART simply costs cycles.

use std::collections::VecDeque;

use crate::config::Config;
use crate::firmware::uart::{Mmio, UartDriver};
use crate::soc::devices::syscon::{CMD_POWEROFF, SYS_REG_CONTROL};

/// Program counter of the step machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Console not yet initialized.
    Init,
    /// Echo loop.
    Running,
    /// Halt byte received; power-off not yet written.
    Halting,
    /// Power-off written; the program does nothing further.
    Halted,
}

/// The echo program and its observable counters.
#[derive(Debug)]
pub struct EchoFirmware {
    uart_base: u64,
    syscon_base: u64,
    baud: u64,
    halt_byte: u8,
    banner: Vec<u8>,
    prompt: Vec<u8>,
    phase: Phase,
    pending: VecDeque<u8>,
    received: Vec<u8>,
    proc_freq: u64,
    divisor: u64,
    tx_count: u64,
}

impl EchoFirmware {
    /// Builds the program from the memory map and firmware settings in `config`.
    pub fn new(config: &Config) -> Self {
        Self {
            uart_base: config.uart.base,
            syscon_base: config.syscon.base,
            baud: config.uart.baud,
            halt_byte: config.firmware.halt_byte,
            banner: config.firmware.banner.as_bytes().to_vec(),
            prompt: config.firmware.prompt.as_bytes().to_vec(),
            phase: Phase::Init,
            pending: VecDeque::new(),
            received: Vec::new(),
            proc_freq: 0,
            divisor: 0,
            tx_count: 0,
        }
    }

    /// Restarts the program from its entry point.
    pub fn reset(&mut self) {
        self.phase = Phase::Init;
        self.pending.clear();
        self.received.clear();
        self.proc_freq = 0;
        self.divisor = 0;
        self.tx_count = 0;
    }

    /// Executes one step against `bus`.
    pub fn step<B: Mmio + ?Sized>(&mut self, bus: &mut B) {
        match self.phase {
            Phase::Init => {
                let (proc_freq, divisor) =
                    UartDriver::new(bus, self.uart_base).init(self.syscon_base, self.baud);
                self.proc_freq = proc_freq;
                self.divisor = divisor;
                self.pending.extend(self.banner.iter().copied());
                self.pending.extend(self.prompt.iter().copied());
                self.phase = Phase::Running;
            }
            Phase::Running => {
                let mut drv = UartDriver::new(bus, self.uart_base);
                if let Some(&c) = self.pending.front() {
                    if drv.try_putchar(c) {
                        let _ = self.pending.pop_front();
                        self.tx_count += 1;
                    }
                } else if let Some(c) = drv.try_getchar() {
                    self.receive(c);
                }
            }
            Phase::Halting => {
                bus.write_u64(self.syscon_base + SYS_REG_CONTROL, CMD_POWEROFF);
                self.phase = Phase::Halted;
            }
            Phase::Halted => {}
        }
    }

    fn receive(&mut self, c: u8) {
        self.received.push(c);
        if c == self.halt_byte {
            self.phase = Phase::Halting;
        } else if c == b'\r' {
            self.pending.extend(b"\r\n".iter().copied());
            self.pending.extend(self.prompt.iter().copied());
        } else {
            self.pending.push_back(c);
        }
    }

    /// Current phase of the step machine.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every byte read from the console since reset, in order.
    pub fn received(&self) -> &[u8] {
        &self.received
    }

    /// Number of bytes written to the console since reset.
    pub fn tx_count(&self) -> u64 {
        self.tx_count
    }

    /// Core clock read from SysCon during init.
    pub fn proc_freq(&self) -> u64 {
        self.proc_freq
    }

    /// Divisor programmed during init.
    pub fn divisor(&self) -> u64 {
        self.divisor
    }
}
