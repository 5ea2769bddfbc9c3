//! Waveform trace recorder.
//!
//! Writes one VCD timestamp per clock phase, indexed by the cycle counter. The
//! first snapshot dumps every signal; later snapshots emit only the signals
//! whose value changed. Signals, in declaration order:
//!
//! * pins: `clock`, `reset`, `io_rx[7:0]`, `io_rx_valid`, `io_rx_ready`,
//!   `io_tx[7:0]`, `io_tx_valid`, `io_terminate`
//! * state: `gpr0`..`gpr31` (64 bits), `cr0`..`cr7` (4 bits), `lr`, `ctr` (64 bits)
//!
//! Recording never fails from the caller's point of view. The first write
//! error is latched, further recording is skipped and the error is returned
//! by [`TraceRecorder::close`].

use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use vcd_ng::{IdCode, TimescaleUnit, Value, VecValue, Writer};

use crate::common::SimError;
use crate::common::constants::{CR_FIELD_MASK, CR_FIELDS, GPR_COUNT};
use crate::config::TraceConfig;
use crate::core::{ArchState, InputPins, OutputPins};

/// Sink shared between the VCD writer and the recorder so the recorder can
/// flush it and hand it back on close.
struct SharedSink<W>(Rc<RefCell<W>>);

impl<W: Write> Write for SharedSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Pin signals and their widths, in declaration and sampling order.
const PIN_SIGNALS: [(&str, u32); 8] = [
    ("clock", 1),
    ("reset", 1),
    ("io_rx", 8),
    ("io_rx_valid", 1),
    ("io_rx_ready", 1),
    ("io_tx", 8),
    ("io_tx_valid", 1),
    ("io_terminate", 1),
];

/// Appends the full pin/state snapshot to `out` in declaration order.
fn sample(inputs: &InputPins, outputs: &OutputPins, state: &ArchState, out: &mut Vec<u64>) {
    out.clear();
    out.extend([
        u64::from(inputs.clock),
        u64::from(inputs.reset),
        u64::from(inputs.serial_in_byte),
        u64::from(inputs.serial_in_valid),
        u64::from(outputs.serial_in_ready),
        u64::from(outputs.serial_out_byte),
        u64::from(outputs.serial_out_valid),
        u64::from(outputs.terminate),
    ]);
    out.extend(state.gpr.iter().copied());
    out.extend(state.cr.iter().map(|f| u64::from(f & CR_FIELD_MASK)));
    out.extend([state.lr, state.ctr]);
}

/// VCD recorder for one simulation run.
pub struct TraceRecorder<W: Write> {
    writer: Writer<SharedSink<W>>,
    sink: Rc<RefCell<W>>,
    /// `(id, width)` per signal.
    signals: Vec<(IdCode, u32)>,
    last: Option<Vec<u64>>,
    scratch: Vec<u64>,
    records: u64,
    failed: Option<io::Error>,
}

impl<W: Write> fmt::Debug for TraceRecorder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceRecorder")
            .field("signals", &self.signals.len())
            .field("records", &self.records)
            .field("failed", &self.failed.is_some())
            .finish()
    }
}

impl TraceRecorder<BufWriter<File>> {
    /// Creates the trace file at `path` and writes the VCD header.
    ///
    /// Any failure here is fatal for the run and is reported before the first
    /// phase is simulated.
    pub fn create(path: &Path, scope: &str, timescale_ns: u32) -> Result<Self, SimError> {
        let open_err = |source| SimError::TraceOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(open_err)?;
        let rec =
            Self::with_header(BufWriter::new(file), scope, timescale_ns).map_err(open_err)?;
        tracing::info!(path = %path.display(), "trace opened");
        Ok(rec)
    }

    /// Opens the trace described by `config`, or returns `None` if tracing is disabled.
    pub fn from_config(config: &TraceConfig) -> Result<Option<Self>, SimError> {
        if !config.enabled {
            return Ok(None);
        }
        Self::create(&config.path, &config.scope, config.timescale_ns).map(Some)
    }
}

impl<W: Write> TraceRecorder<W> {
    /// Builds a recorder over an arbitrary writer and writes the VCD header.
    pub fn new(writer: W, scope: &str, timescale_ns: u32) -> Result<Self, SimError> {
        Self::with_header(writer, scope, timescale_ns).map_err(SimError::TraceWrite)
    }

    fn with_header(writer: W, scope: &str, timescale_ns: u32) -> io::Result<Self> {
        let sink = Rc::new(RefCell::new(writer));
        let mut writer = Writer::new(SharedSink(Rc::clone(&sink)));
        writer.timescale(timescale_ns, TimescaleUnit::NS)?;
        writer.add_module(scope)?;

        let mut signals = Vec::with_capacity(PIN_SIGNALS.len() + GPR_COUNT + CR_FIELDS + 2);
        for (name, width) in PIN_SIGNALS {
            signals.push((writer.add_wire(width, name)?, width));
        }
        for i in 0..GPR_COUNT {
            signals.push((writer.add_wire(64, &format!("gpr{i}"))?, 64));
        }
        for i in 0..CR_FIELDS {
            signals.push((writer.add_wire(4, &format!("cr{i}"))?, 4));
        }
        signals.push((writer.add_wire(64, "lr")?, 64));
        signals.push((writer.add_wire(64, "ctr")?, 64));

        writer.upscope()?;
        writer.enddefinitions()?;

        Ok(Self {
            writer,
            sink,
            signals,
            last: None,
            scratch: Vec::new(),
            records: 0,
            failed: None,
        })
    }

    /// Records the snapshot of one phase at timestamp `time`.
    pub fn record(
        &mut self,
        time: u64,
        inputs: &InputPins,
        outputs: &OutputPins,
        state: &ArchState,
    ) {
        if self.failed.is_some() {
            return;
        }
        let mut values = std::mem::take(&mut self.scratch);
        sample(inputs, outputs, state, &mut values);
        match self.write_changes(time, &values) {
            Ok(()) => {
                self.records += 1;
                self.scratch = self.last.replace(values).unwrap_or_default();
            }
            Err(err) => {
                tracing::warn!(time, error = %err, "trace write failed; recording disabled");
                self.failed = Some(err);
            }
        }
    }

    fn write_changes(&mut self, time: u64, values: &[u64]) -> io::Result<()> {
        self.writer.timestamp(time)?;
        for (i, (&(id, width), &value)) in self.signals.iter().zip(values).enumerate() {
            let unchanged = self.last.as_ref().is_some_and(|last| last[i] == value);
            if unchanged {
                continue;
            }
            if width == 1 {
                self.writer.change_scalar(id, bit(value, 0))?;
            } else {
                let bits: Vec<Value> = (0..width).rev().map(|b| bit(value, b)).collect();
                self.writer.change_vector(id, &VecValue::from(bits))?;
            }
        }
        Ok(())
    }

    /// Number of snapshots written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Flushes the trace and returns the underlying writer.
    ///
    /// Fails with the first latched write error, if any.
    pub fn close(self) -> Result<W, SimError> {
        let Self {
            writer,
            sink,
            records,
            failed,
            ..
        } = self;
        if let Some(err) = failed {
            return Err(SimError::TraceWrite(err));
        }
        drop(writer);
        sink.borrow_mut().flush().map_err(SimError::TraceWrite)?;
        let inner = Rc::try_unwrap(sink)
            .map_err(|_| SimError::TraceWrite(io::Error::other("trace sink still shared")))?
            .into_inner();
        tracing::info!(records, "trace closed");
        Ok(inner)
    }
}

fn bit(value: u64, pos: u32) -> Value {
    if (value >> pos) & 1 == 1 {
        Value::V1
    } else {
        Value::V0
    }
}
