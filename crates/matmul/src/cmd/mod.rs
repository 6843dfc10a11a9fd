use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use matmul_codec::DEFAULT_DIMENSION;
use matmul_transport::DEFAULT_DEVICE_PATH;
use tracing::warn;

use crate::exit::{CliError, CliResult, INTERNAL, INTERRUPTED, USAGE};
use crate::output::OutputFormat;

#[cfg(unix)]
pub mod remote;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run multiplication rounds against a device (the default).
    Run(RunArgs),
    /// Serve products on a Unix socket, standing in for the remote processor.
    #[cfg(unix)]
    Remote(RemoteArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        #[cfg(unix)]
        Command::Remote(args) => remote::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Device to open: an rpmsg character device or a Unix socket.
    #[arg(short = 'd', long, value_name = "PATH", default_value = DEFAULT_DEVICE_PATH)]
    pub device: PathBuf,
    /// Number of rounds to run.
    #[arg(short = 'n', long, value_name = "COUNT", default_value_t = 1)]
    pub rounds: u64,
    /// Matrix dimension N; must match the remote side.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_DIMENSION)]
    pub dimension: usize,
    /// Seed for operand generation. Random when omitted.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
    /// Pause after each round's handoff (e.g. 1s, 250ms, 0).
    #[arg(long, value_name = "DURATION", default_value = "1s")]
    pub pace: String,
    /// Print only results, not the generated operands.
    #[arg(long)]
    pub results_only: bool,
}

#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Matrix dimension N; must match the session side.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_DIMENSION)]
    pub dimension: usize,
    /// Exit after serving this many connections.
    #[arg(long, value_name = "COUNT")]
    pub connections: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `500ms`, `2s` or a bare number of seconds. Zero is allowed.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, from_unit): (&str, fn(u64) -> Duration) =
        if let Some(num) = input.strip_suffix("ms") {
            (num, Duration::from_millis)
        } else if let Some(num) = input.strip_suffix('s') {
            (num, Duration::from_secs)
        } else {
            (input, Duration::from_secs)
        };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    Ok(from_unit(value))
}

/// Set the returned flag on Ctrl-C, then call `on_signal`.
///
/// Work only stops between rounds, so a task blocked on a silent device
/// never sees the flag. A second Ctrl-C exits the process immediately.
pub fn install_ctrlc_handler<F>(on_signal: F) -> CliResult<Arc<AtomicBool>>
where
    F: Fn() + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        if !first_interrupt(&flag) {
            eprintln!("error: interrupted");
            std::process::exit(INTERRUPTED);
        }
        warn!("stopping after the current round; press Ctrl-C again to exit now");
        on_signal();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))?;
    Ok(stop)
}

fn first_interrupt(flag: &AtomicBool) -> bool {
    !flag.swap(true, Ordering::SeqCst)
}
