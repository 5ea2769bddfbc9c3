//! The stepped-model boundary.
//!
//! A [`ClockedModel`] is an opaque synchronous state machine. It only advances
//! inside [`ClockedModel::evaluate`], using whatever input pins were presented
//! last. The driver never looks inside it beyond the output pins and the
//! architectural snapshot.

use crate::core::arch::ArchState;
use crate::core::pins::{InputPins, OutputPins};

/// Trait implemented by every core model the driver can clock.
///
/// Evaluation is total: it cannot fail and must always return.
pub trait ClockedModel {
    /// Presents new input pin levels; takes effect on the next `evaluate`.
    fn set_input_pins(&mut self, pins: InputPins);

    /// Settles the model for the currently presented inputs.
    ///
    /// Sequential logic updates on the rising edge, i.e. the first evaluation
    /// after `clock` goes from low to high.
    fn evaluate(&mut self);

    /// Returns the current output pin levels.
    fn output_pins(&self) -> OutputPins;

    /// Returns a copy of the architectural register state.
    fn state_snapshot(&self) -> ArchState;

    /// Returns `true` once the model requests the run to end without the
    /// termination protocol (an HDL `$finish`).
    fn finished(&self) -> bool {
        false
    }
}

impl<M: ClockedModel + ?Sized> ClockedModel for Box<M> {
    fn set_input_pins(&mut self, pins: InputPins) {
        (**self).set_input_pins(pins);
    }

    fn evaluate(&mut self) {
        (**self).evaluate();
    }

    fn output_pins(&self) -> OutputPins {
        (**self).output_pins()
    }

    fn state_snapshot(&self) -> ArchState {
        (**self).state_snapshot()
    }

    fn finished(&self) -> bool {
        (**self).finished()
    }
}
