//! # Architectural State Tests
//!
//! Tests for the condition register packing and the exact register dump format.

use pretty_assertions::assert_eq;
use wattsim_core::core::ArchState;

fn sample_state() -> ArchState {
    let mut state = ArchState::default();
    state.gpr[0] = 0;
    state.gpr[1] = 0xDEAD_BEEF;
    state.gpr[31] = u64::MAX;
    state.cr = [0x8, 0x4, 0x2, 0x1, 0x0, 0xF, 0x0, 0xA];
    state.lr = 0x1100;
    state.ctr = 42;
    state
}

#[test]
fn test_cr_word_packs_field0_high() {
    let state = sample_state();
    assert_eq!(state.cr_word(), 0x8421_0F0A);
}

#[test]
fn test_cr_word_masks_fields() {
    let mut state = ArchState::default();
    state.cr[7] = 0xF3;
    assert_eq!(state.cr_word(), 0x3);
}

#[test]
fn test_dump_has_35_lines() {
    let text = sample_state().to_string();
    assert_eq!(text.lines().count(), 35);
    assert!(text.ends_with('\n'));
}

#[test]
fn test_dump_gpr_lines() {
    let text = sample_state().to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "GPR0 0000000000000000");
    assert_eq!(lines[1], "GPR1 00000000DEADBEEF");
    assert_eq!(lines[10], "GPR10 0000000000000000");
    assert_eq!(lines[31], "GPR31 FFFFFFFFFFFFFFFF");
}

#[test]
fn test_dump_cr_lr_ctr_lines() {
    let text = sample_state().to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[32], "CR 0000000084210F0A");
    assert_eq!(lines[33], "LR 0000000000001100");
    assert_eq!(lines[34], "CTR 000000000000002A");
}

#[test]
fn test_dump_register_names_in_order() {
    let text = ArchState::default().to_string();
    let names: Vec<&str> = text
        .lines()
        .map(|l| l.split(' ').next().unwrap())
        .collect();
    let mut expected: Vec<String> = (0..32).map(|i| format!("GPR{i}")).collect();
    expected.extend(["CR", "LR", "CTR"].map(String::from));
    assert_eq!(names, expected);
}

#[test]
fn test_write_dump_matches_display() {
    let state = sample_state();
    let mut out = Vec::new();
    state.write_dump(&mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), state.to_string());
}
