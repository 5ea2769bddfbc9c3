//! UART transport bridge between the model's serial pins and the host.
//!
//! Runs once per full cycle, after both phases have been evaluated. At most
//! one byte moves in each direction per call. A host byte that arrives while
//! the model cannot take it is held here and offered again on later cycles.

use crate::common::SimError;
use crate::core::{InputPins, OutputPins};
use crate::sim::host::HostPort;

/// Bytes moved by one bridge transfer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transfer {
    /// Byte forwarded from the model to the host.
    pub sent: Option<u8>,
    /// Byte placed on the model's serial-in pins for the next cycle.
    pub delivered: Option<u8>,
    /// A host byte is waiting because the model was not ready.
    pub held_back: bool,
}

/// One-byte-per-direction serial bridge.
#[derive(Debug, Default)]
pub struct UartBridge {
    held: Option<u8>,
}

impl UartBridge {
    /// Creates a bridge with no byte held back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host byte waiting for the model to become ready, if any.
    pub fn held(&self) -> Option<u8> {
        self.held
    }

    /// Moves one byte in each direction.
    ///
    /// `outputs` are the model's pins after the last evaluated phase; `pins`
    /// are the driver pins the next cycle will present.
    pub fn transfer<P: HostPort + ?Sized>(
        &mut self,
        outputs: &OutputPins,
        pins: &mut InputPins,
        host: &mut P,
    ) -> Result<Transfer, SimError> {
        let sent = self.drain(outputs, host)?;

        if self.held.is_none() {
            self.held = host.poll_byte().map_err(SimError::HostIo)?;
        }

        let mut transfer = Transfer {
            sent,
            ..Transfer::default()
        };
        match self.held {
            Some(byte) if outputs.serial_in_ready => {
                pins.serial_in_byte = byte;
                pins.serial_in_valid = true;
                self.held = None;
                transfer.delivered = Some(byte);
                tracing::debug!(byte, "host -> model");
            }
            Some(_) => {
                pins.serial_in_valid = false;
                transfer.held_back = true;
            }
            None => pins.serial_in_valid = false,
        }
        Ok(transfer)
    }

    /// Forwards the model's pending output byte, if any, without touching the
    /// input direction.
    pub fn drain<P: HostPort + ?Sized>(
        &mut self,
        outputs: &OutputPins,
        host: &mut P,
    ) -> Result<Option<u8>, SimError> {
        if !outputs.serial_out_valid {
            return Ok(None);
        }
        let byte = outputs.serial_out_byte;
        host.write_byte(byte).map_err(SimError::HostIo)?;
        tracing::debug!(byte, "model -> host");
        Ok(Some(byte))
    }
}
