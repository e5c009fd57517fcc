mod signals;

use std::{path::PathBuf, process::exit, time::Duration};

use clap::{Args, Parser, Subcommand, ValueEnum};
use collatz_core::{
    utils::time::DurationStyle, CancellationToken, InitialValue, RunConfig, RunController,
    RunOutcome,
};
use common::constants::DEFAULT_SAVE_INTERVAL_SECS;
use eyre::WrapErr;
use tracing::info;
use tracing_subscriber::{self, prelude::*, EnvFilter};

/// Counts the Collatz total stopping time of very large numbers, saving
/// progress so long runs can be stopped and resumed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    source: SourceCommand,

    #[command(flatten)]
    options: RunOptions,
}

#[derive(Subcommand, Debug)]
enum SourceCommand {
    /// Start from 2^POWER - 1
    Mersenne {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        power: u32,
    },

    /// Start from 2^POWER + 1
    PlusOne {
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        power: u32,
    },

    /// Start from a file holding a bare hexadecimal number
    File {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Start from a decimal number, or a hexadecimal (0x) or binary (0b) one.
    /// A leading zero is read as decimal, not octal
    Number { value: String },
}

impl From<SourceCommand> for InitialValue {
    fn from(command: SourceCommand) -> Self {
        match command {
            SourceCommand::Mersenne { power } => InitialValue::Mersenne(power),
            SourceCommand::PlusOne { power } => InitialValue::PowerPlusOne(power),
            SourceCommand::File { path } => InitialValue::File(path),
            SourceCommand::Number { value } => InitialValue::Number(value),
        }
    }
}

#[derive(Args, Debug)]
struct RunOptions {
    /// Directory holding checkpoint files
    #[arg(long, global = true, env = "COLLATZ_CHECKPOINT_DIR", default_value = ".")]
    checkpoint_dir: PathBuf,

    /// Seconds between forced checkpoint saves, 0 disables them
    #[arg(long, global = true, env = "COLLATZ_SAVE_INTERVAL", default_value_t = DEFAULT_SAVE_INTERVAL_SECS)]
    save_interval: u64,

    /// Result record format
    #[arg(long, global = true, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// How the elapsed time is spelled out in CSV records
    #[arg(long, global = true, value_enum, default_value_t = DurationFormat::Days)]
    duration_style: DurationFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum Format {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
enum DurationFormat {
    Minutes,
    Days,
}

impl From<DurationFormat> for DurationStyle {
    fn from(format: DurationFormat) -> Self {
        match format {
            DurationFormat::Minutes => DurationStyle::Minutes,
            DurationFormat::Days => DurationStyle::Days,
        }
    }
}

fn main() {
    let log_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(log_filter);
    tracing_subscriber::registry().with(log_layer).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        exit(1);
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let options = cli.options;
    let token = CancellationToken::new();
    signals::install(&token).wrap_err("failed to install signal handlers")?;
    if options.save_interval > 0 {
        token
            .spawn_periodic(Duration::from_secs(options.save_interval))
            .wrap_err("failed to start the checkpoint timer")?;
    }

    let config = RunConfig::new(cli.source.into(), &options.checkpoint_dir);
    let controller = RunController::new(config);

    match controller.run(&token)? {
        RunOutcome::Completed(report) => match options.format {
            Format::Csv => println!("{}", report.to_csv(options.duration_style.into())),
            Format::Json => println!("{}", serde_json::to_string(&report)?),
        },
        RunOutcome::Stopped { steps, elapsed } => info!(
            steps,
            elapsed_secs = elapsed.as_secs_f64(),
            checkpoint = %controller.checkpoint_path().display(),
            "stopped, rerun the same command to resume"
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sources_and_options() {
        let cli = Cli::try_parse_from([
            "collatz",
            "mersenne",
            "31",
            "--checkpoint-dir",
            "/tmp/runs",
            "--save-interval",
            "0",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(InitialValue::from(cli.source), InitialValue::Mersenne(31));
        assert_eq!(cli.options.checkpoint_dir, PathBuf::from("/tmp/runs"));
        assert_eq!(cli.options.save_interval, 0);
        assert_eq!(cli.options.format, Format::Json);
        assert_eq!(cli.options.duration_style, DurationFormat::Days);

        let cli = Cli::try_parse_from(["collatz", "number", "0x1f"]).unwrap();
        assert_eq!(
            InitialValue::from(cli.source),
            InitialValue::Number("0x1f".to_string())
        );
    }

    #[test]
    fn rejects_non_positive_exponents() {
        assert!(Cli::try_parse_from(["collatz", "mersenne", "0"]).is_err());
        assert!(Cli::try_parse_from(["collatz", "plus-one", "-3"]).is_err());
        assert!(Cli::try_parse_from(["collatz", "mersenne", "ten"]).is_err());
    }
}
