//! Global Driver Constants.
//!
//! This module defines constants shared across the driver. It includes:
//! 1. **Clocking Constants:** Reset duration and phases per full cycle.
//! 2. **Architectural Constants:** Register file and condition register shapes.
//! 3. **Exit Constants:** Process status codes used by the front end.

/// Number of full cycles the model is held in reset before the run loop starts.
///
/// Models a known-good reset duration for the core's internal state machines.
pub const RESET_CYCLES: u64 = 5;

/// Number of clock phases (high, low) in one full cycle.
pub const PHASES_PER_CYCLE: u64 = 2;

/// Number of general-purpose registers in the dumped architectural state.
pub const GPR_COUNT: usize = 32;

/// Number of 4-bit condition register fields (CR0..CR7).
pub const CR_FIELDS: usize = 8;

/// Mask applied to each condition register field.
pub const CR_FIELD_MASK: u8 = 0xF;

/// Process status after the termination protocol completes.
pub const EXIT_TERMINATED: i32 = 1;

/// Process status after a host interruption.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Process status for configuration or startup failures.
pub const EXIT_STARTUP_FAILURE: i32 = 2;
