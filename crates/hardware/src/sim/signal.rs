//! Host interruption.
//!
//! SIGINT and SIGTERM are blocked in the calling thread and taken
//! synchronously by a watcher thread with `sigwait`. The watcher only raises
//! the simulator's stop flag; the clock loop notices it before the next full
//! cycle and closes the trace on its way out.
//!
//! Install the watcher from the main thread before spawning any other thread
//! (the stdin reader in particular), so every thread inherits the blocked mask.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread::JoinHandle;

use crate::common::SimError;

/// Blocks SIGINT/SIGTERM and spawns the watcher that raises `flag`.
#[cfg(unix)]
pub fn install_interrupt_watcher(flag: Arc<AtomicBool>) -> Result<JoinHandle<()>, SimError> {
    use std::io;
    use std::sync::atomic::Ordering;
    use std::thread;

    let set = interrupt_set();
    // SAFETY: `set` is a fully initialized signal set; a null old-mask pointer is allowed.
    let rc = unsafe { libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut()) };
    if rc != 0 {
        return Err(SimError::Signal(io::Error::from_raw_os_error(rc)));
    }

    thread::Builder::new()
        .name("interrupt-watcher".into())
        .spawn(move || {
            loop {
                let mut sig: libc::c_int = 0;
                // SAFETY: `set` is owned by this closure and initialized; `sig` is a
                // valid out pointer.
                let rc = unsafe { libc::sigwait(&set, &mut sig) };
                if rc != 0 {
                    tracing::warn!(
                        error = %io::Error::from_raw_os_error(rc),
                        "sigwait failed; interrupt watcher exiting"
                    );
                    return;
                }
                if flag.swap(true, Ordering::Relaxed) {
                    tracing::warn!(signal = sig, "interrupt already pending");
                } else {
                    tracing::info!(
                        signal = sig,
                        "interrupt received; stopping after this cycle"
                    );
                }
            }
        })
        .map_err(SimError::Signal)
}

/// Interrupt handling is only wired up on Unix hosts.
#[cfg(not(unix))]
pub fn install_interrupt_watcher(_flag: Arc<AtomicBool>) -> Result<JoinHandle<()>, SimError> {
    Err(SimError::Signal(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interrupt watcher requires a Unix host",
    )))
}

#[cfg(unix)]
fn interrupt_set() -> libc::sigset_t {
    // SAFETY: `sigemptyset` initializes the zeroed set before any other use;
    // SIGINT and SIGTERM are valid signal numbers.
    unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        let _ = libc::sigemptyset(&mut set);
        let _ = libc::sigaddset(&mut set, libc::SIGINT);
        let _ = libc::sigaddset(&mut set, libc::SIGTERM);
        set
    }
}
