//! # Simulation Tests







/// VCD recorder.
pub mod trace;
