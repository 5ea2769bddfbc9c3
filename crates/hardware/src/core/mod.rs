//! Processor core boundary.
//!
//! The hardware core's internal logic is an external collaborator. This module
//! defines the stable boundary the driver talks to and a small reference core:
//! 1. **Pins:** The input and output pin bundles exchanged every phase.
//! 2. **Model:** The [`ClockedModel`] trait implemented by every stepped core.
//! 3. **Architecture:** The architectural state dumped by the termination protocol.
//! 4. **Echo core:** A reference model running the UART echo firmware.

/// Architectural register state (GPRs, condition register, LR, CTR).
pub mod arch;

/// Reference core that runs the echo firmware against the SoC devices.
pub mod echo;

/// The stepped-model trait.
pub mod model;

/// Input and output pin bundles.
pub mod pins;

pub use self::arch::ArchState;
pub use self::echo::EchoCore;
pub use self::model::ClockedModel;
pub use self::pins::{InputPins, OutputPins};
