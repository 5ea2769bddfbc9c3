//! # Trace Recorder Tests
//!
//! Tests for the VCD header, change-only recording, latched write errors and
//! trace file creation.

use pretty_assertions::assert_eq;
use wattsim_core::common::SimError;
use wattsim_core::config::TraceConfig;
use wattsim_core::core::{ArchState, InputPins, OutputPins};
use wattsim_core::sim::TraceRecorder;

use crate::common::harness::vcd_timestamps;
use crate::common::mocks::io::FailingWriter;

fn record_phase(rec: &mut TraceRecorder<impl std::io::Write>, time: u64, clock: bool) {
    let inputs = InputPins {
        clock,
        ..InputPins::default()
    };
    rec.record(time, &inputs, &OutputPins::default(), &ArchState::default());
}

/// Lines between two timestamps, i.e. the value changes written at `time`.
fn changes_at(vcd: &str, time: u64) -> Vec<String> {
    let marker = format!("#{time}");
    vcd.lines()
        .skip_while(|l| l.trim() != marker)
        .skip(1)
        .take_while(|l| !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_header_declares_every_signal() {
    let rec = TraceRecorder::new(Vec::new(), "top", 10).unwrap();
    let vcd = String::from_utf8(rec.close().unwrap()).unwrap();

    assert!(vcd.contains("$timescale"));
    assert!(vcd.contains("10"));
    assert!(vcd.contains("top"));
    assert!(vcd.contains("$enddefinitions"));

    let vars: Vec<&str> = vcd.lines().filter(|l| l.contains("$var")).collect();
    assert_eq!(vars.len(), 8 + 32 + 8 + 2);
    for name in [
        "clock",
        "reset",
        "io_rx",
        "io_rx_valid",
        "io_rx_ready",
        "io_tx",
        "io_tx_valid",
        "io_terminate",
        "gpr0",
        "gpr31",
        "cr0",
        "cr7",
        "lr",
        "ctr",
    ] {
        assert!(
            vars.iter().any(|l| l.split_whitespace().any(|w| w == name)),
            "missing {name}"
        );
    }
    assert!(vars.iter().any(|l| l.contains(" 64 ") && l.contains("gpr5")));
    assert!(vars.iter().any(|l| l.contains(" 4 ") && l.contains("cr3")));
    assert!(vars.iter().any(|l| l.contains(" 8 ") && l.contains("io_tx")));
}

#[test]
fn test_first_record_dumps_everything_then_changes_only() {
    let mut rec = TraceRecorder::new(Vec::new(), "core", 1).unwrap();
    record_phase(&mut rec, 0, true);
    record_phase(&mut rec, 1, false);
    record_phase(&mut rec, 2, false);
    assert_eq!(rec.records(), 3);
    let vcd = String::from_utf8(rec.close().unwrap()).unwrap();

    assert_eq!(vcd_timestamps(&vcd), vec![0, 1, 2]);
    assert_eq!(changes_at(&vcd, 0).len(), 50);
    assert_eq!(changes_at(&vcd, 1).len(), 1, "only the clock toggles");
    assert!(changes_at(&vcd, 2).is_empty());
}

#[test]
fn test_vectors_written_msb_first() {
    let mut rec = TraceRecorder::new(Vec::new(), "core", 1).unwrap();
    let mut state = ArchState::default();
    state.cr[0] = 0x8;
    let outputs = OutputPins {
        serial_out_byte: 0x41,
        ..OutputPins::default()
    };
    rec.record(0, &InputPins::default(), &outputs, &state);
    let vcd = String::from_utf8(rec.close().unwrap()).unwrap();

    let changes = changes_at(&vcd, 0);
    assert!(changes.iter().any(|l| l.starts_with("b01000001 ")));
    assert!(changes.iter().any(|l| l.starts_with("b1000 ")));
}

#[test]
fn test_wide_register_change_keeps_full_width() {
    let mut rec = TraceRecorder::new(Vec::new(), "core", 1).unwrap();
    let mut state = ArchState::default();
    rec.record(0, &InputPins::default(), &OutputPins::default(), &state);
    state.lr = 0x8000_0000_0000_0001;
    rec.record(1, &InputPins::default(), &OutputPins::default(), &state);
    let vcd = String::from_utf8(rec.close().unwrap()).unwrap();

    let changes = changes_at(&vcd, 1);
    assert_eq!(changes.len(), 1, "only lr changed");
    let expected = format!("b1{}1 ", "0".repeat(62));
    assert!(changes[0].starts_with(&expected), "got {}", changes[0]);
}

#[test]
fn test_write_failure_is_latched_and_reported_on_close() {
    let rec = TraceRecorder::new(FailingWriter::new(1 << 20), "core", 1).unwrap();
    let header_len = rec.close().unwrap().written.len();

    let mut rec = TraceRecorder::new(FailingWriter::new(header_len + 4), "core", 1).unwrap();
    for t in 0..10 {
        record_phase(&mut rec, t, t % 2 == 0);
    }
    assert_eq!(rec.records(), 0);
    assert!(matches!(rec.close(), Err(SimError::TraceWrite(_))));
}

#[test]
fn test_header_failure() {
    let err = TraceRecorder::new(FailingWriter::new(0), "core", 1).unwrap_err();
    assert!(matches!(err, SimError::TraceWrite(_)));
}

#[test]
fn test_create_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.vcd");
    let mut rec = TraceRecorder::create(&path, "core", 1).unwrap();
    record_phase(&mut rec, 0, true);
    drop(rec.close().unwrap());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("$enddefinitions"));
    assert_eq!(vcd_timestamps(&text), vec![0]);
}

#[test]
fn test_create_in_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("run.vcd");
    match TraceRecorder::create(&path, "core", 1) {
        Err(SimError::TraceOpen { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected TraceOpen, got {other:?}"),
    }
}

#[test]
fn test_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TraceConfig::default();
    assert!(TraceRecorder::from_config(&config).unwrap().is_none());

    config.enabled = true;
    config.path = dir.path().join("cfg.vcd");
    let rec = TraceRecorder::from_config(&config).unwrap();
    assert!(rec.is_some());
    assert!(config.path.exists());
}
