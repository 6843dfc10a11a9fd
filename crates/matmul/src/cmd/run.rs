use std::sync::Arc;

use matmul_session::{Session, SessionConfig};
use matmul_transport::Device;
use tracing::{info, warn};

use crate::cmd::{install_ctrlc_handler, parse_duration, RunArgs};
use crate::exit::{session_error, transport_error, CliResult, SUCCESS};
use crate::output::{ConsoleReporter, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SessionConfig {
        round_count: args.rounds,
        dimension: args.dimension,
        pace: parse_duration(&args.pace)?,
        seed: args.seed,
        ..SessionConfig::default()
    };

    config
        .validate()
        .map_err(|err| session_error("invalid configuration", err))?;
    let device = Device::open(&args.device).map_err(|err| transport_error("open failed", err))?;

    let mut reporter = ConsoleReporter::new(format);
    if args.results_only {
        reporter = reporter.results_only();
    }

    let stop = install_ctrlc_handler(|| {})?;
    let summary = Session::new(config, device, Arc::new(reporter))
        .map_err(|err| session_error("invalid configuration", err))?
        .with_stop_flag(stop)
        .run()
        .map_err(|err| session_error("session failed", err))?;

    if summary.rounds_reported < args.rounds {
        warn!(
            requested = args.rounds,
            reported = summary.rounds_reported,
            "stopped before all rounds completed"
        );
    } else {
        info!(rounds = summary.rounds_reported, "all rounds completed");
    }
    Ok(SUCCESS)
}
