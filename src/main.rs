use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use closest_to::{ClosestOptions, Date, DateInput, closest_index_to_with, closest_to_with, time};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "closest-to",
    version,
    allow_negative_numbers = true,
    about = "Print the candidate date closest to a reference date"
)]
struct Cli {
    /// Reference date (ISO-8601, Date.toString form, or epoch milliseconds)
    #[arg(short, long, allow_hyphen_values = true)]
    reference: String,

    /// Candidate dates, same syntax as the reference
    candidates: Vec<String>,

    /// Read further candidates from a file, one per line
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Ignore invalid candidates instead of returning Invalid Date
    #[arg(long)]
    skip_invalid: bool,

    /// Print the position of the closest candidate instead of the date
    #[arg(long)]
    index: bool,

    /// How to render the resulting date
    #[arg(long, value_enum, default_value_t = OutputFormat::Iso)]
    format: OutputFormat,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Iso,
    Ms,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("error reading {}: {source}", path.display())]
    ReadCandidates {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Plain numbers are epoch milliseconds; everything else is date text.
fn parse_input(arg: &str) -> DateInput {
    match arg.trim().parse::<f64>() {
        Ok(n) => DateInput::Number(n),
        Err(_) => DateInput::Text(arg.to_string()),
    }
}

fn read_candidates(path: &Path) -> Result<Vec<String>, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::ReadCandidates {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(source
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn render(date: Date, format: OutputFormat) -> String {
    match format {
        OutputFormat::Iso => date.to_string(),
        OutputFormat::Ms => time::format_time_value(date.time()),
    }
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let mut raw = cli.candidates.clone();
    if let Some(path) = &cli.file {
        raw.extend(read_candidates(path)?);
    }
    info!(count = raw.len(), "scanning candidates");

    let reference = parse_input(&cli.reference);
    let candidates = raw.iter().map(|c| parse_input(c));
    let options = if cli.skip_invalid {
        ClosestOptions::skip_invalid()
    } else {
        ClosestOptions::default()
    };

    let output = if cli.index {
        closest_index_to_with(reference, candidates, &options)
            .map_or_else(|| "undefined".to_string(), |i| i.to_string())
    } else {
        closest_to_with(reference, candidates, &options)
            .map_or_else(|| "undefined".to_string(), |d| render(d, cli.format))
    };
    Ok(output)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_filter_from_verbosity(
            cli.verbose,
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(1)
        }
    }
}
