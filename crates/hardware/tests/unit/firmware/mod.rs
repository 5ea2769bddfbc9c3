//! # Firmware Tests

/// Echo program step machine.
pub mod echo;
