mod cmd;
mod exit;
mod logging;
mod output;

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Args, CommandFactory, FromArgMatches, Parser};

use crate::cmd::{Command, RunArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "matmul",
    version,
    about = "Offload matrix products to a remote processor over rpmsg"
)]
struct Cli {
    /// Output format for matrices (stdout).
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(flatten)]
    run: RunArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// Parse `args`, rejecting top-level run options next to a subcommand.
    ///
    /// Global options may appear anywhere; only the flattened run options
    /// are tied to the bare form.
    fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = Self::command();
        let matches = command.try_get_matches_from_mut(args)?;
        let cli = Self::from_arg_matches(&matches)?;

        if let Some(subcommand) = matches.subcommand_name() {
            let run_ids = RunArgs::augment_args(clap::Command::new("run"))
                .get_arguments()
                .map(|arg| arg.get_id().as_str().to_owned())
                .collect::<Vec<_>>();
            if let Some(id) = run_ids
                .iter()
                .find(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine))
            {
                let flag = id.replace('_', "-");
                return Err(command.error(
                    ErrorKind::ArgumentConflict,
                    format!("'--{flag}' cannot be used before the '{subcommand}' subcommand"),
                ));
            }
        }
        Ok(cli)
    }

    /// A bare invocation runs a session with the top-level options.
    fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

fn main() {
    let cli = Cli::try_parse_args(std::env::args_os()).unwrap_or_else(|err| err.exit());
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.into_command(), format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
