//! Co-simulation driver CLI.
//!
//! This binary runs the reference echo core with its serial link on the
//! terminal. It performs:
//! 1. **Setup:** Logging to stderr, interrupt watcher, configuration and trace file.
//! 2. **Run:** Reset, clock until termination, interruption, finish or cycle limit.
//! 3. **Exit:** Statistics to stderr, then the process status of the outcome.
//!
//! stdout carries the serial output and the register dump and nothing else.

use std::io;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wattsim_core::EchoCore;
use wattsim_core::common::SimError;
use wattsim_core::common::constants::EXIT_STARTUP_FAILURE;
use wattsim_core::config::Config;
use wattsim_core::sim::{
    RunOutcome, Simulator, StdioPort, TraceRecorder, install_interrupt_watcher,
};

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "Cycle-accurate co-simulation driver",
    long_about = "Clock the reference core, bridge its UART to stdin/stdout and dump its registers on termination.\n\nExamples:\n  sim\n  sim --trace core.vcd --max-cycles 100000\n  sim --config sim.json --no-stats\n\nSet RUST_LOG (e.g. RUST_LOG=debug) for driver logs on stderr."
)]
struct Cli {
    /// JSON configuration file. Built-in defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record a VCD trace, optionally to the given path.
    #[arg(short, long, num_args = 0..=1, value_name = "PATH")]
    trace: Option<Option<PathBuf>>,

    /// Stop after this many full cycles, reset included.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Do not print run statistics on exit.
    #[arg(long)]
    no_stats: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(outcome) => {
            tracing::info!(?outcome, "run ended");
            process::exit(outcome.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(EXIT_STARTUP_FAILURE);
        }
    }
}

/// Builds the simulator from the command line and runs it to completion.
fn run(cli: Cli) -> Result<RunOutcome, SimError> {
    // Must precede every other thread so the signal mask is inherited.
    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = install_interrupt_watcher(Arc::clone(&stop)) {
        tracing::warn!(error = %e, "running without interrupt handling");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(path) = cli.trace {
        config.trace.enabled = true;
        if let Some(path) = path {
            config.trace.path = path;
        }
    }
    if cli.max_cycles.is_some() {
        config.general.max_cycles = cli.max_cycles;
    }

    let trace = TraceRecorder::from_config(&config.trace)?;
    let core = EchoCore::new(&config);
    let mut sim = Simulator::with_trace(core, trace)
        .with_max_cycles(config.general.max_cycles)
        .with_stop_flag(stop);

    let mut host = StdioPort::new();
    let stdout = io::stdout();
    let outcome = sim.run(&mut host, &mut stdout.lock())?;

    if !cli.no_stats {
        sim.stats().print();
    }
    Ok(outcome)
}
