//! Simulator: owns the model, the clock and every per-run observer.
//!
//! One `Simulator` is one run. It holds the cycle counter, the optional trace,
//! the bridge state and the termination state, so several runs can coexist in
//! a process. Each call to [`Simulator::step`] performs one full cycle
//! followed by the observers, in this order:
//!
//! 1. stop flag (host interruption)
//! 2. clock high / low with trace records
//! 3. UART bridge
//! 4. termination check, and on first assertion the drain cycle and dump
//! 5. model `finished()` and the cycle limit
//!
//! The trace is closed exactly once on every path that ends the run, including
//! errors and dropping the simulator mid-run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::common::constants::{EXIT_INTERRUPTED, EXIT_TERMINATED};
use crate::common::{RESET_CYCLES, SimError};
use crate::core::{ArchState, ClockedModel};
use crate::sim::bridge::UartBridge;
use crate::sim::clock::ClockDriver;
use crate::sim::host::HostPort;
use crate::sim::termination::{TerminationHandler, TerminationState};
use crate::sim::trace::TraceRecorder;
use crate::stats::SimStats;

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model asserted `terminate`; the drain cycle ran and the state was dumped.
    Terminated {
        /// Full cycles completed when `terminate` was first observed.
        cycle: u64,
        /// Architectural state after the drain cycle, as dumped.
        state: ArchState,
    },
    /// The model reported `finished()`.
    Finished {
        /// Full cycles completed.
        cycle: u64,
    },
    /// The configured cycle limit was reached.
    CycleLimit {
        /// Full cycles completed.
        cycle: u64,
    },
    /// The stop flag was raised by the host.
    Interrupted {
        /// Full cycles completed.
        cycle: u64,
    },
}

impl RunOutcome {
    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Terminated { .. } => EXIT_TERMINATED,
            Self::Interrupted { .. } => EXIT_INTERRUPTED,
            Self::Finished { .. } | Self::CycleLimit { .. } => 0,
        }
    }

    /// Full cycles completed when the outcome was decided.
    pub fn cycle(&self) -> u64 {
        match *self {
            Self::Terminated { cycle, .. }
            | Self::Finished { cycle }
            | Self::CycleLimit { cycle }
            | Self::Interrupted { cycle } => cycle,
        }
    }
}

/// Top-level co-simulation driver.
pub struct Simulator<M: ClockedModel, W: Write = BufWriter<File>> {
    model: M,
    clock: ClockDriver,
    trace: Option<TraceRecorder<W>>,
    trace_output: Option<W>,
    bridge: UartBridge,
    termination: TerminationHandler,
    stop: Arc<AtomicBool>,
    max_cycles: Option<u64>,
    reset_done: bool,
    outcome: Option<RunOutcome>,
    stats: SimStats,
}

impl<M: ClockedModel + std::fmt::Debug, W: Write> std::fmt::Debug for Simulator<M, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("model", &self.model)
            .field("time", &self.clock.counter())
            .field("trace", &self.trace)
            .field("termination", &self.termination.state())
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl<M: ClockedModel> Simulator<M> {
    /// Creates an untraced simulator around `model`.
    pub fn new(model: M) -> Self {
        Self::with_trace(model, None)
    }
}

impl<M: ClockedModel, W: Write> Simulator<M, W> {
    /// Creates a simulator that records into `trace` when one is given.
    ///
    /// The trace must already be open; opening it is the caller's fatal
    /// startup step.
    pub fn with_trace(model: M, trace: Option<TraceRecorder<W>>) -> Self {
        Self {
            model,
            clock: ClockDriver::new(),
            trace,
            trace_output: None,
            bridge: UartBridge::new(),
            termination: TerminationHandler::new(),
            stop: Arc::new(AtomicBool::new(false)),
            max_cycles: None,
            reset_done: false,
            outcome: None,
            stats: SimStats::default(),
        }
    }

    /// Ends the run with [`RunOutcome::CycleLimit`] after `limit` full cycles,
    /// reset cycles included.
    pub fn with_max_cycles(mut self, limit: Option<u64>) -> Self {
        self.max_cycles = limit;
        self
    }

    /// Shares `flag` as the stop flag checked before every cycle.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = flag;
        self
    }

    /// Handle to the stop flag.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Simulation time: phases elapsed since construction.
    pub fn time(&self) -> u64 {
        self.clock.counter().get()
    }

    /// Full cycles elapsed since construction.
    pub fn cycles(&self) -> u64 {
        self.clock.counter().full_cycles()
    }

    /// The model under simulation.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Run statistics so far.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Termination protocol state.
    pub fn termination_state(&self) -> TerminationState {
        self.termination.state()
    }

    /// The outcome, once the run has ended.
    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    /// Whether the trace is still open.
    pub fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    /// Takes the writer of a closed trace.
    pub fn take_trace_output(&mut self) -> Option<W> {
        self.trace_output.take()
    }

    /// Holds reset for the fixed number of full cycles, then releases it.
    ///
    /// Runs once; later calls do nothing. [`Simulator::step`] calls it on
    /// first use.
    pub fn reset(&mut self) {
        if self.reset_done {
            return;
        }
        self.clock.set_reset(true);
        for _ in 0..RESET_CYCLES {
            self.advance();
        }
        self.clock.set_reset(false);
        self.stats.reset_cycles = RESET_CYCLES;
        self.reset_done = true;
        tracing::info!(cycle = self.cycles(), "reset released");
    }

    /// Runs one full cycle and its observers.
    ///
    /// Returns the outcome once the run has ended; further calls return the
    /// same outcome without advancing the clock. On error the trace is closed
    /// before the error is returned.
    pub fn step<P, D>(
        &mut self,
        host: &mut P,
        dump: &mut D,
    ) -> Result<Option<RunOutcome>, SimError>
    where
        P: HostPort + ?Sized,
        D: Write + ?Sized,
    {
        if self.outcome.is_some() {
            return Ok(self.outcome);
        }
        match self.step_inner(host, dump) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if let Err(close_err) = self.close_trace() {
                    tracing::warn!(error = %close_err, "trace close failed after run error");
                }
                Err(err)
            }
        }
    }

    /// Steps until the run ends.
    pub fn run<P, D>(&mut self, host: &mut P, dump: &mut D) -> Result<RunOutcome, SimError>
    where
        P: HostPort + ?Sized,
        D: Write + ?Sized,
    {
        loop {
            if let Some(outcome) = self.step(host, dump)? {
                return Ok(outcome);
            }
        }
    }

    fn step_inner<P, D>(
        &mut self,
        host: &mut P,
        dump: &mut D,
    ) -> Result<Option<RunOutcome>, SimError>
    where
        P: HostPort + ?Sized,
        D: Write + ?Sized,
    {
        self.reset();

        if self.stop.load(Ordering::Relaxed) {
            let cycle = self.cycles();
            tracing::info!(cycle, "interrupted by host");
            return self.halt(RunOutcome::Interrupted { cycle });
        }

        self.advance();
        let outputs = self.model.output_pins();
        let transfer = self
            .bridge
            .transfer(&outputs, self.clock.pins_mut(), host)?;
        self.stats.record_transfer(&transfer);

        let cycle = self.cycles();
        if self.termination.observe(&outputs, cycle) {
            self.advance();
            if self.bridge.drain(&self.model.output_pins(), host)?.is_some() {
                self.stats.bytes_to_host += 1;
            }
            let state = self.model.state_snapshot();
            state.write_dump(dump).map_err(SimError::Dump)?;
            return self.halt(RunOutcome::Terminated { cycle, state });
        }

        if self.model.finished() {
            tracing::info!(cycle, "model finished");
            return self.halt(RunOutcome::Finished { cycle });
        }

        if self.max_cycles.is_some_and(|limit| cycle >= limit) {
            tracing::info!(cycle, "cycle limit reached");
            return self.halt(RunOutcome::CycleLimit { cycle });
        }

        Ok(None)
    }

    fn advance(&mut self) {
        self.clock.advance_cycle(&mut self.model, self.trace.as_mut());
        let counter = self.clock.counter();
        self.stats.phases = counter.get();
        self.stats.full_cycles = counter.full_cycles();
    }

    fn halt(&mut self, outcome: RunOutcome) -> Result<Option<RunOutcome>, SimError> {
        self.outcome = Some(outcome);
        self.close_trace()?;
        Ok(Some(outcome))
    }

    fn close_trace(&mut self) -> Result<(), SimError> {
        if let Some(rec) = self.trace.take() {
            self.trace_output = Some(rec.close()?);
        }
        Ok(())
    }
}

impl<M: ClockedModel, W: Write> Drop for Simulator<M, W> {
    fn drop(&mut self) {
        if let Err(err) = self.close_trace() {
            tracing::warn!(error = %err, "trace close failed on drop");
        }
    }
}
