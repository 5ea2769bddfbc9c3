//! Co-simulation driver.
//!
//! This module drives a [`ClockedModel`](crate::core::ClockedModel) and connects it to the host:
//! 1. **Clock:** Two-phase clocking and the monotonic cycle counter.
//! 2. **Trace:** Optional VCD waveform, one snapshot per phase.
//! 3. **Bridge:** One byte per direction per full cycle between the serial pins and the host.
//! 4. **Termination:** The one-shot drain, dump and halt protocol.
//! 5. **Simulator:** The owning driver context that sequences all of the above.

/// UART transport bridge.
pub mod bridge;

/// Two-phase clock driver and cycle counter.
pub mod clock;

/// Host endpoints of the serial link.
pub mod host;

/// SIGINT/SIGTERM watcher raising the stop flag.
pub mod signal;

/// Driver context and run loop.
pub mod simulator;

/// Termination protocol state.
pub mod termination;

/// VCD waveform recorder.
pub mod trace;

pub use bridge::{Transfer, UartBridge};
pub use clock::{ClockDriver, CycleCounter};
pub use host::{BufferPort, HostPort, StdioPort};
pub use signal::install_interrupt_watcher;
pub use simulator::{RunOutcome, Simulator};
pub use termination::{TerminationHandler, TerminationState};
pub use trace::TraceRecorder;
