//! # Car Analyzer - descriptive statistics over a JSON car collection
//!
//! Loads `{"cars": [...]}` documents into an in-memory table, prints a few
//! fixed statistics and saves the table as CSV.
//!
//! ## Modules
//!
//! - **table**: the column store, its JSON loader, text rendering and CSV writer
//! - **stats**: unique counts, means, top-N and value counts over the table
//! - **analyzer**: the staged pipeline that prints results and logs failures
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use car_analyzer::{AnalyzerConfig, CarData};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut cars = CarData::new(AnalyzerConfig::default());
//! let summary = cars.run_all()?;
//! assert_eq!(summary.failed(), 0);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::Write;

pub mod analyzer;
pub mod stats;
pub mod table;
pub mod types;

pub use analyzer::CarData;
pub use stats::StatsError;
pub use table::{CarTable, Column, ColumnKind, LoadError, PersistError};
pub use types::{AnalyzerConfig, RunSummary, Stage, StageOutcome};

/// Main entry point: run every stage against `config`, printing to `out`.
/// Fails only when the source cannot be loaded.
pub fn analyze<W: Write>(config: AnalyzerConfig, out: W) -> Result<RunSummary> {
    let input = config.input.clone();
    let mut cars = CarData::with_sink(config, out);
    cars.run_all()
        .with_context(|| format!("Failed to load car data from {}", input.display()))
}
