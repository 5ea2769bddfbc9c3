//! # Echo Program Tests
//!
//! Tests for the echo step machine run directly against the SoC bus, with the
//! serial pins driven by hand.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use pretty_assertions::assert_eq;
use wattsim_core::firmware::echo::{EchoFirmware, Phase};
use wattsim_core::soc::Bus;
use wattsim_core::soc::devices::{PotatoUart, SysCon};

use crate::common::harness::test_config;

struct Rig {
    firmware: EchoFirmware,
    bus: Bus,
    exit: Arc<AtomicU64>,
    sent: Vec<u8>,
}

impl Rig {
    fn new() -> Self {
        let config = test_config();
        let exit = Arc::new(AtomicU64::new(u64::MAX));
        let mut bus = Bus::new();
        bus.add_device(Box::new(PotatoUart::new(config.uart.base)));
        bus.add_device(Box::new(SysCon::new(
            config.syscon.base,
            config.syscon.clock_hz,
            Arc::clone(&exit),
        )));
        Self {
            firmware: EchoFirmware::new(&config),
            bus,
            exit,
            sent: Vec::new(),
        }
    }

    /// One firmware step followed by draining the TX holding register.
    fn step(&mut self) {
        self.firmware.step(&mut self.bus);
        if let Some(byte) = self.bus.uart_mut().and_then(|u| u.shift_out()) {
            self.sent.push(byte);
        }
    }

    fn steps(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }

    fn feed(&mut self, byte: u8) {
        let uart = self.bus.uart_mut().unwrap();
        assert!(uart.shift_in(byte), "receiver busy");
    }

    /// Feeds each byte once the receiver is free, stepping in between.
    fn type_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            while !self.bus.uart_mut().unwrap().rx_ready() {
                self.step();
            }
            self.feed(b);
            self.step();
        }
    }
}

#[test]
fn test_starts_in_init() {
    let rig = Rig::new();
    assert_eq!(rig.firmware.phase(), Phase::Init);
    assert_eq!(rig.firmware.tx_count(), 0);
}

#[test]
fn test_init_programs_uart_and_queues_banner() {
    let mut rig = Rig::new();
    rig.step();
    assert_eq!(rig.firmware.phase(), Phase::Running);
    assert_eq!(rig.firmware.proc_freq(), 50_000_000);
    assert_eq!(rig.firmware.divisor(), 26);
    assert_eq!(rig.bus.uart_mut().unwrap().divisor(), 26);

    rig.steps(20);
    assert_eq!(rig.sent, b"boot\r\n> ");
    assert_eq!(rig.firmware.tx_count(), 8);
}

#[test]
fn test_echo_and_newline_prompt() {
    let mut rig = Rig::new();
    rig.steps(10);
    rig.sent.clear();

    rig.type_bytes(b"hi\r");
    rig.steps(10);
    assert_eq!(rig.firmware.received(), b"hi\r");
    assert_eq!(rig.sent, b"hi\r\n> ");
}

#[test]
fn test_output_before_input() {
    let mut rig = Rig::new();
    rig.step();
    // A byte arrives while the banner is still going out.
    rig.feed(b'z');
    rig.steps(8);
    assert_eq!(rig.firmware.received(), b"");
    rig.steps(4);
    assert_eq!(rig.firmware.received(), b"z");
    assert!(rig.sent.ends_with(b"> z"));
}

#[test]
fn test_halt_byte_powers_off() {
    let mut rig = Rig::new();
    rig.steps(10);
    rig.type_bytes(&[0x04]);
    assert_eq!(rig.firmware.phase(), Phase::Halting);
    assert_eq!(rig.exit.load(Ordering::Relaxed), u64::MAX);

    rig.step();
    assert_eq!(rig.firmware.phase(), Phase::Halted);
    assert_eq!(rig.exit.load(Ordering::Relaxed), 0);

    let sent_before = rig.sent.len();
    rig.steps(5);
    assert_eq!(rig.firmware.phase(), Phase::Halted);
    assert_eq!(rig.sent.len(), sent_before, "halt byte is not echoed");
}

#[test]
fn test_reset_restarts_program() {
    let mut rig = Rig::new();
    rig.steps(10);
    rig.type_bytes(b"ab");
    rig.firmware.reset();
    assert_eq!(rig.firmware.phase(), Phase::Init);
    assert_eq!(rig.firmware.received(), b"");
    assert_eq!(rig.firmware.tx_count(), 0);
    assert_eq!(rig.firmware.divisor(), 0);
    assert_eq!(rig.firmware.proc_freq(), 0);
}
