//! Pin bundles exchanged between the driver and a clocked model.
//!
//! Input pins are driver-owned and presented to the model before each
//! evaluation. Output pins are model-owned and sampled after evaluation.

/// Driver-owned input pins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputPins {
    /// Clock level for the next evaluation.
    pub clock: bool,
    /// Synchronous reset.
    pub reset: bool,
    /// Byte offered to the model's serial receiver.
    pub serial_in_byte: u8,
    /// `serial_in_byte` holds a new byte for the next rising edge.
    pub serial_in_valid: bool,
}

/// Model-owned output pins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputPins {
    /// Byte leaving the model's serial transmitter.
    pub serial_out_byte: u8,
    /// `serial_out_byte` carries a byte shifted out during the last rising edge.
    pub serial_out_valid: bool,
    /// The model's receiver can accept a byte on the next rising edge.
    pub serial_in_ready: bool,
    /// The model has signalled test completion.
    pub terminate: bool,
}
