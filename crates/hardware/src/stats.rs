//! Run statistics collection and reporting.
//!
//! This module tracks what the driver loop did during one run. It provides:
//! 1. **Clock:** Full cycles and phases driven, and the resulting host-side simulation rate.
//! 2. **Serial link:** Bytes moved in each direction and cycles a host byte spent held back.
//!
//! The report goes to stderr; stdout belongs to the serial stream and the register dump.

use std::io::{self, Write};
use std::time::Instant;

use crate::sim::bridge::Transfer;

/// Run statistics structure.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Full clock cycles driven, reset included.
    pub full_cycles: u64,
    /// Clock phases driven.
    pub phases: u64,
    /// Cycles spent with reset asserted.
    pub reset_cycles: u64,
    /// Bytes forwarded from the model to the host.
    pub bytes_to_host: u64,
    /// Bytes delivered from the host to the model.
    pub bytes_from_host: u64,
    /// Cycles on which a host byte was held back because the model was not ready.
    pub held_back_cycles: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            full_cycles: 0,
            phases: 0,
            reset_cycles: 0,
            bytes_to_host: 0,
            bytes_from_host: 0,
            held_back_cycles: 0,
        }
    }
}

impl SimStats {
    /// Accounts one bridge transfer.
    pub fn record_transfer(&mut self, transfer: &Transfer) {
        if transfer.sent.is_some() {
            self.bytes_to_host += 1;
        }
        if transfer.delivered.is_some() {
            self.bytes_from_host += 1;
        }
        if transfer.held_back {
            self.held_back_cycles += 1;
        }
    }

    /// Writes the statistics report to `out`.
    pub fn write_report<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let khz = if seconds > 0.0 {
            (self.full_cycles as f64 / seconds) / 1000.0
        } else {
            0.0
        };

        writeln!(out, "\n==========================================================")?;
        writeln!(out, "CO-SIMULATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        writeln!(out, "host_seconds             {seconds:.4} s")?;
        writeln!(out, "sim_cycles               {}", self.full_cycles)?;
        writeln!(out, "sim_phases               {}", self.phases)?;
        writeln!(out, "sim_reset_cycles         {}", self.reset_cycles)?;
        writeln!(out, "sim_freq                 {khz:.2} kHz")?;
        writeln!(out, "----------------------------------------------------------")?;
        writeln!(out, "SERIAL LINK")?;
        writeln!(out, "  uart.to_host           {}", self.bytes_to_host)?;
        writeln!(out, "  uart.from_host         {}", self.bytes_from_host)?;
        writeln!(out, "  uart.held_back_cycles  {}", self.held_back_cycles)?;
        writeln!(out, "----------------------------------------------------------")?;
        Ok(())
    }

    /// Prints the statistics report to stderr.
    pub fn print(&self) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        if let Err(err) = self.write_report(&mut handle) {
            tracing::warn!(error = %err, "could not print statistics");
        }
    }
}
