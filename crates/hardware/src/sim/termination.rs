//! Termination protocol state.
//!
//! The model asserts `terminate` to signal completion. The first assertion
//! moves the handler from running to terminating; the driver then runs one
//! drain cycle, dumps the architectural state and halts. Later assertions are
//! ignored.

use crate::core::OutputPins;

/// Termination protocol state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TerminationState {
    /// `terminate` has not been observed.
    #[default]
    Running,
    /// `terminate` was observed at the given full cycle. Terminal.
    Terminating {
        /// Full cycles completed when the flag was first seen.
        cycle: u64,
    },
}

/// One-shot observer of the model's `terminate` pin.
#[derive(Debug, Default)]
pub struct TerminationHandler {
    state: TerminationState,
}

impl TerminationHandler {
    /// Creates a handler in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> TerminationState {
        self.state
    }

    /// Whether termination has been observed.
    pub fn is_terminating(&self) -> bool {
        matches!(self.state, TerminationState::Terminating { .. })
    }

    /// Inspects the pins after a full cycle.
    ///
    /// Returns `true` exactly once: on the first cycle `terminate` is seen.
    pub fn observe(&mut self, outputs: &OutputPins, cycle: u64) -> bool {
        if self.is_terminating() || !outputs.terminate {
            return false;
        }
        tracing::info!(cycle, "terminate asserted");
        self.state = TerminationState::Terminating { cycle };
        true
    }
}
