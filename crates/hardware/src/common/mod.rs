//! Common types and constants shared by every part of the co-simulation driver.
//!
//! This module provides:
//! 1. **Constants:** Reset duration, phase accounting, and architectural register counts.
//! 2. **Error Handling:** The driver and configuration error enums.

/// Common constants used throughout the driver.
pub mod constants;

/// Error types for the driver loop and configuration loading.
pub mod error;

pub use constants::{CR_FIELDS, GPR_COUNT, PHASES_PER_CYCLE, RESET_CYCLES};
pub use error::{ConfigError, SimError};
