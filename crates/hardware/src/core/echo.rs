//! Reference echo core.
//!
//! A [`ClockedModel`] that stands in for a synthesized core: it owns the SoC
//! bus (console UART and SysCon) and runs [`EchoFirmware`] one step per rising
//! clock edge. The serial pins are wired to the UART holding registers and the
//! `terminate` pin follows SysCon's exit request.
//!
//! Register conventions of the snapshot:
//!
//! | Register | Contents                                                  |
//! |----------|-----------------------------------------------------------|
//! | `r3`     | exit code once halted, else last received byte            |
//! | `r4`     | bytes received since reset                                |
//! | `r5`     | bytes transmitted since reset                             |
//! | `r6`     | programmed UART divisor                                   |
//! | `r7`     | core clock read from `CLKINFO`                            |
//! | `CR0`    | last received byte compared with `'\r'` (LT, GT, EQ)       |
//! | `LR`     | entry address of the routine currently executing          |
//! | `CTR`    | rising edges since reset was released                     |

use std::cmp::Ordering as CmpOrdering;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::Config;
use crate::core::arch::ArchState;
use crate::core::model::ClockedModel;
use crate::core::pins::{InputPins, OutputPins};
use crate::firmware::echo::{EchoFirmware, Phase};
use crate::soc::Bus;
use crate::soc::devices::syscon::NO_EXIT;
use crate::soc::devices::{PotatoUart, SysCon};

/// Entry address of the console init routine.
const ROUTINE_INIT: u64 = 0x1000;
/// Entry address of the echo loop.
const ROUTINE_ECHO: u64 = 0x1100;
/// Entry address of the power-off routine.
const ROUTINE_HALT: u64 = 0x1200;

/// CR field bits.
const CR_LT: u8 = 0x8;
const CR_GT: u8 = 0x4;
const CR_EQ: u8 = 0x2;

/// Reference core running the echo firmware.
#[derive(Debug)]
pub struct EchoCore {
    bus: Bus,
    firmware: EchoFirmware,
    exit_request: Arc<AtomicU64>,
    inputs: InputPins,
    last_clock: bool,
    outputs: OutputPins,
    edges: u64,
}

impl EchoCore {
    /// Builds the core and its SoC from `config`.
    pub fn new(config: &Config) -> Self {
        let exit_request = Arc::new(AtomicU64::new(NO_EXIT));
        let mut bus = Bus::new();
        bus.add_device(Box::new(PotatoUart::new(config.uart.base)));
        bus.add_device(Box::new(SysCon::new(
            config.syscon.base,
            config.syscon.clock_hz,
            Arc::clone(&exit_request),
        )));

        Self {
            bus,
            firmware: EchoFirmware::new(config),
            exit_request,
            inputs: InputPins::default(),
            last_clock: false,
            outputs: OutputPins::default(),
            edges: 0,
        }
    }

    /// The firmware and its counters.
    pub fn firmware(&self) -> &EchoFirmware {
        &self.firmware
    }

    /// Exit code requested through SysCon, if any.
    pub fn exit_code(&self) -> Option<u64> {
        let val = self.exit_request.load(Ordering::Relaxed);
        if val == NO_EXIT { None } else { Some(val) }
    }

    /// Programmed UART divisor as seen by the device.
    pub fn uart_divisor(&mut self) -> u64 {
        self.bus.uart_mut().map_or(0, |uart| uart.divisor())
    }

    fn rising_edge(&mut self) {
        if self.inputs.reset {
            if let Some(uart) = self.bus.uart_mut() {
                uart.reset();
            }
            self.firmware.reset();
            self.exit_request.store(NO_EXIT, Ordering::Relaxed);
            self.outputs.serial_out_byte = 0;
            self.outputs.serial_out_valid = false;
            self.edges = 0;
            return;
        }

        self.edges += 1;
        if let Some(uart) = self.bus.uart_mut() {
            if self.inputs.serial_in_valid && !uart.shift_in(self.inputs.serial_in_byte) {
                tracing::warn!(
                    byte = self.inputs.serial_in_byte,
                    "serial-in strobe while receiver full; byte lost"
                );
            }
            match uart.shift_out() {
                Some(byte) => {
                    self.outputs.serial_out_byte = byte;
                    self.outputs.serial_out_valid = true;
                }
                None => self.outputs.serial_out_valid = false,
            }
        }
        self.firmware.step(&mut self.bus);
    }

    fn settle_outputs(&mut self) {
        self.outputs.serial_in_ready = self.bus.uart_mut().is_some_and(|uart| uart.rx_ready());
        self.outputs.terminate = self.exit_code().is_some();
    }
}

impl ClockedModel for EchoCore {
    fn set_input_pins(&mut self, pins: InputPins) {
        self.inputs = pins;
    }

    fn evaluate(&mut self) {
        let posedge = self.inputs.clock && !self.last_clock;
        self.last_clock = self.inputs.clock;
        if posedge {
            self.rising_edge();
        }
        self.settle_outputs();
    }

    fn output_pins(&self) -> OutputPins {
        self.outputs
    }

    fn state_snapshot(&self) -> ArchState {
        let mut state = ArchState::default();
        let received = self.firmware.received();
        let last = received.last().copied();

        state.gpr[3] = match self.exit_code() {
            Some(code) => code,
            None => last.map_or(0, u64::from),
        };
        state.gpr[4] = received.len() as u64;
        state.gpr[5] = self.firmware.tx_count();
        state.gpr[6] = self.firmware.divisor();
        state.gpr[7] = self.firmware.proc_freq();

        state.cr[0] = match last.map(|c| c.cmp(&b'\r')) {
            Some(CmpOrdering::Less) => CR_LT,
            Some(CmpOrdering::Greater) => CR_GT,
            Some(CmpOrdering::Equal) => CR_EQ,
            None => 0,
        };
        state.lr = match self.firmware.phase() {
            Phase::Init => ROUTINE_INIT,
            Phase::Running => ROUTINE_ECHO,
            Phase::Halting | Phase::Halted => ROUTINE_HALT,
        };
        state.ctr = self.edges;
        state
    }
}
