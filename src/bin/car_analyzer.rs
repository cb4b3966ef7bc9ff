//! car-analyzer: print statistics about a JSON car collection and save it as CSV
//!
//! Usage:
//!   # Read cars.txt, print results, write cars.csv
//!   car-analyzer
//!
//!   # Different source and destination
//!   car-analyzer --input fleet.json --output fleet.csv
//!
//!   # Debug logging (RUST_LOG takes precedence)
//!   car-analyzer --verbose

// Use MiMalloc allocator (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use car_analyzer::AnalyzerConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "car-analyzer")]
#[command(about = "Descriptive statistics over a JSON car collection", long_about = None)]
struct Args {
    /// JSON source file (default: cars.txt)
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// CSV destination (default: cars.csv)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Top-level key holding the records (default: cars)
    #[arg(long)]
    records_key: Option<String>,

    /// Log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Build config
    let mut config = AnalyzerConfig::default();
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(key) = args.records_key {
        config.records_key = key;
    }

    let summary = car_analyzer::analyze(config, std::io::stdout())?;
    debug!(
        "run finished, {} of {} stages failed: {}",
        summary.failed(),
        summary.stages.len(),
        serde_json::to_string(&summary)?
    );

    Ok(())
}

/// Logs go to stderr so stdout only carries results
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
