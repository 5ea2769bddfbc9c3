//! Architectural state visible to the driver.

/// Register snapshot and the fixed-format register dump.
pub mod state;

pub use self::state::ArchState;
