//! # Echo Core Tests
//!
//! Tests for the reference core: reset behaviour, serial pins, SysCon-driven
//! termination and the register conventions of its snapshot.

use pretty_assertions::assert_eq;
use wattsim_core::config::Config;
use wattsim_core::core::{ClockedModel, EchoCore, OutputPins};
use wattsim_core::sim::ClockDriver;

use crate::common::harness::{TestContext, test_config};

const ROUTINE_INIT: u64 = 0x1000;
const ROUTINE_ECHO: u64 = 0x1100;
const ROUTINE_HALT: u64 = 0x1200;

fn cycle(driver: &mut ClockDriver, core: &mut EchoCore) {
    driver.advance_cycle::<EchoCore, Vec<u8>>(core, None);
}

fn hold_reset(driver: &mut ClockDriver, core: &mut EchoCore, cycles: u64) {
    driver.set_reset(true);
    for _ in 0..cycles {
        cycle(driver, core);
    }
    driver.set_reset(false);
}

fn post_reset_outputs() -> OutputPins {
    OutputPins {
        serial_in_ready: true,
        ..OutputPins::default()
    }
}

#[test]
fn test_post_reset_state() {
    let mut core = EchoCore::new(&test_config());
    let mut driver = ClockDriver::new();
    hold_reset(&mut driver, &mut core, 5);

    assert_eq!(core.output_pins(), post_reset_outputs());
    let state = core.state_snapshot();
    assert_eq!(state.gpr, [0; 32]);
    assert_eq!(state.cr, [0; 8]);
    assert_eq!(state.lr, ROUTINE_INIT);
    assert_eq!(state.ctr, 0);
    assert_eq!(core.exit_code(), None);
}

#[test]
fn test_first_edge_initializes_uart() {
    let mut core = EchoCore::new(&test_config());
    let mut driver = ClockDriver::new();
    hold_reset(&mut driver, &mut core, 5);
    cycle(&mut driver, &mut core);

    let state = core.state_snapshot();
    assert_eq!(state.gpr[6], 26, "50 MHz / (115200 * 16) - 1");
    assert_eq!(state.gpr[7], 50_000_000);
    assert_eq!(state.lr, ROUTINE_ECHO);
    assert_eq!(state.ctr, 1);
    assert_eq!(core.uart_divisor(), 26);
}

#[test]
fn test_divisor_from_clkinfo() {
    let mut config = Config::default();
    config.syscon.clock_hz = 115_200 * 16 * 10;
    let mut core = EchoCore::new(&config);
    let mut driver = ClockDriver::new();
    hold_reset(&mut driver, &mut core, 5);
    cycle(&mut driver, &mut core);
    assert_eq!(core.uart_divisor(), 9);
    assert_eq!(core.state_snapshot().gpr[6], 9);
}

#[test]
fn test_reset_is_deterministic_after_activity() {
    let mut ctx = TestContext::untraced();
    ctx.send(b"abc");
    assert!(ctx.run_until_output(b"abc"));

    let mut driver = ClockDriver::new();
    let core = ctx.sim.model_mut();
    hold_reset(&mut driver, core, 5);

    let mut fresh = EchoCore::new(&test_config());
    let mut fresh_driver = ClockDriver::new();
    hold_reset(&mut fresh_driver, &mut fresh, 5);

    assert_eq!(core.output_pins(), fresh.output_pins());
    assert_eq!(core.state_snapshot(), fresh.state_snapshot());
    assert_eq!(core.firmware().received(), b"");
}

#[test]
fn test_low_phase_does_not_advance() {
    let mut core = EchoCore::new(&test_config());
    let mut driver = ClockDriver::new();
    hold_reset(&mut driver, &mut core, 5);

    let mut pins = *driver.pins();
    pins.clock = false;
    for _ in 0..4 {
        core.set_input_pins(pins);
        core.evaluate();
    }
    assert_eq!(core.state_snapshot().ctr, 0);
    assert_eq!(core.state_snapshot().lr, ROUTINE_INIT);
}

#[test]
fn test_serial_in_latched_on_rising_edge() {
    let mut core = EchoCore::new(&test_config());
    let mut driver = ClockDriver::new();
    hold_reset(&mut driver, &mut core, 5);
    cycle(&mut driver, &mut core);

    // Banner output is pending, so the byte stays in the receiver.
    driver.pins_mut().serial_in_byte = b'x';
    driver.pins_mut().serial_in_valid = true;
    cycle(&mut driver, &mut core);
    driver.pins_mut().serial_in_valid = false;

    assert!(!core.output_pins().serial_in_ready);
    assert_eq!(core.firmware().received(), b"");
}

#[test]
fn test_serial_out_carries_banner() {
    let mut core = EchoCore::new(&test_config());
    let mut driver = ClockDriver::new();
    hold_reset(&mut driver, &mut core, 5);

    let mut sent = Vec::new();
    for _ in 0..20 {
        cycle(&mut driver, &mut core);
        let out = core.output_pins();
        if out.serial_out_valid {
            sent.push(out.serial_out_byte);
        }
    }
    assert!(sent.starts_with(b"boot\r\n> "));
}

#[test]
fn test_halt_byte_asserts_terminate() {
    let mut ctx = TestContext::untraced();
    assert!(ctx.run_until_output(b"> "));
    ctx.send(&[0x04]);
    let _ = ctx.run_cycles(10);

    let core = ctx.sim.model();
    assert!(core.output_pins().terminate);
    assert_eq!(core.exit_code(), Some(0));
    let state = core.state_snapshot();
    assert_eq!(state.gpr[3], 0, "exit code");
    assert_eq!(state.lr, ROUTINE_HALT);
}

#[test]
fn test_snapshot_tracks_received_bytes() {
    let mut ctx = TestContext::untraced();
    assert!(ctx.run_until_output(b"> "));
    let banner_and_prompt = ctx.host.output.len() as u64;

    ctx.send(b"a");
    assert!(ctx.run_until_output(b"> a"));
    let state = ctx.sim.model().state_snapshot();
    assert_eq!(state.gpr[3], u64::from(b'a'));
    assert_eq!(state.gpr[4], 1);
    assert_eq!(state.gpr[5], banner_and_prompt + 1);
    assert_eq!(state.cr[0], 0x4, "'a' > '\\r'");

    ctx.send(b"\r");
    assert!(ctx.run_until_output(b"\r\n> "));
    let state = ctx.sim.model().state_snapshot();
    assert_eq!(state.gpr[3], u64::from(b'\r'));
    assert_eq!(state.gpr[4], 2);
    assert_eq!(state.cr[0], 0x2, "'\\r' == '\\r'");

    ctx.send(b"\n");
    let _ = ctx.run_cycles(10);
    assert_eq!(ctx.sim.model().state_snapshot().cr[0], 0x8, "'\\n' < '\\r'");
}
