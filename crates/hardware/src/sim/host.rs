//! Host side of the serial link.
//!
//! The bridge talks to the host through [`HostPort`]: a non-blocking byte
//! source and a (possibly blocking) byte sink.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::mpsc::{Receiver, TryRecvError, channel};
use std::thread;

/// Byte-oriented host endpoint of the serial link.
pub trait HostPort {
    /// Returns the next byte from the host if one is available, without blocking.
    fn poll_byte(&mut self) -> io::Result<Option<u8>>;

    /// Delivers one byte to the host. May block; must not drop the byte.
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;
}

impl<P: HostPort + ?Sized> HostPort for &mut P {
    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).poll_byte()
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }
}

/// Standard input and output of the process.
///
/// Standard input is read by a background thread so polling never blocks the
/// clock loop. End of input leaves the source permanently empty.
#[derive(Debug)]
pub struct StdioPort {
    rx: Receiver<u8>,
    eof_logged: bool,
}

impl StdioPort {
    /// Spawns the stdin reader thread.
    pub fn new() -> Self {
        let (tx, rx) = channel();

        let spawned = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                let mut buffer = [0u8; 1];
                let stdin = io::stdin();
                let mut handle = stdin.lock();
                while handle.read_exact(&mut buffer).is_ok() {
                    if tx.send(buffer[0]).is_err() {
                        break;
                    }
                }
            });
        if let Err(err) = spawned {
            tracing::warn!(error = %err, "could not spawn stdin reader; host input disabled");
        }

        Self {
            rx,
            eof_logged: false,
        }
    }
}

impl Default for StdioPort {
    fn default() -> Self {
        Self::new()
    }
}

impl HostPort for StdioPort {
    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        match self.rx.try_recv() {
            Ok(byte) => Ok(Some(byte)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                if !self.eof_logged {
                    tracing::debug!("host input closed");
                    self.eof_logged = true;
                }
                Ok(None)
            }
        }
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let mut out = io::stdout().lock();
        out.write_all(&[byte])?;
        out.flush()
    }
}

/// In-memory host endpoint: a scripted input queue and a captured output buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BufferPort {
    /// Bytes the host will offer, front first.
    pub input: VecDeque<u8>,
    /// Bytes the model has sent to the host.
    pub output: Vec<u8>,
}

impl BufferPort {
    /// Creates a port that will offer `input` to the model.
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: Vec::new(),
        }
    }
}

impl HostPort for BufferPort {
    fn poll_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(self.input.pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }
}
