//! Two-phase clock driver.
//!
//! A full cycle is a high phase followed by a low phase. Each phase drives the
//! clock pin, evaluates the model once, records the resulting snapshot (when a
//! trace is attached) and then advances the cycle counter. Nothing else may
//! run between the two phases of a cycle.

use std::fmt;
use std::io::Write;

use crate::common::PHASES_PER_CYCLE;
use crate::core::{ClockedModel, InputPins};
use crate::sim::trace::TraceRecorder;

/// Monotonic phase counter. Doubles as the simulation timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleCounter(u64);

impl CycleCounter {
    /// Phases elapsed since construction.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Full cycles elapsed since construction.
    pub const fn full_cycles(self) -> u64 {
        self.0 / PHASES_PER_CYCLE
    }

    fn tick(&mut self) {
        self.0 += 1;
    }
}

impl fmt::Display for CycleCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drives the clock and holds the pins the driver owns.
#[derive(Debug, Default)]
pub struct ClockDriver {
    counter: CycleCounter,
    pins: InputPins,
}

impl ClockDriver {
    /// Creates a driver at time zero with every input pin low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current counter value.
    pub fn counter(&self) -> CycleCounter {
        self.counter
    }

    /// Driver-owned input pins applied on the next phase.
    pub fn pins(&self) -> &InputPins {
        &self.pins
    }

    /// Mutable access to the pins for the bridge and reset sequencing.
    pub fn pins_mut(&mut self) -> &mut InputPins {
        &mut self.pins
    }

    /// Drives the reset pin.
    pub fn set_reset(&mut self, asserted: bool) {
        self.pins.reset = asserted;
    }

    /// Runs one full cycle: clock high, evaluate, record, tick; clock low,
    /// evaluate, record, tick.
    pub fn advance_cycle<M, W>(
        &mut self,
        model: &mut M,
        mut trace: Option<&mut TraceRecorder<W>>,
    ) where
        M: ClockedModel + ?Sized,
        W: Write,
    {
        for level in [true, false] {
            self.pins.clock = level;
            model.set_input_pins(self.pins);
            model.evaluate();
            if let Some(rec) = trace.as_deref_mut() {
                rec.record(
                    self.counter.get(),
                    &self.pins,
                    &model.output_pins(),
                    &model.state_snapshot(),
                );
            }
            self.counter.tick();
        }
    }
}
