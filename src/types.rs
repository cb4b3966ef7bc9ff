use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// JSON source holding the car records
    pub input: PathBuf,

    /// Top-level key whose array holds the records
    pub records_key: String,

    /// Destination of the CSV copy of the table
    pub output: PathBuf,

    /// Rows shown by the preview stage
    pub preview_rows: usize,

    /// Rows listed by the heaviest-cars stage
    pub top_n: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            input: PathBuf::from("cars.txt"),
            records_key: String::from("cars"),
            output: PathBuf::from("cars.csv"),
            preview_rows: 5,
            top_n: 5,
        }
    }
}

/// The fixed stages of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Preview,
    UniqueCars,
    AverageHorsepower,
    TopHeaviest,
    PerManufacturer,
    PerYear,
    Save,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Load,
        Stage::Preview,
        Stage::UniqueCars,
        Stage::AverageHorsepower,
        Stage::TopHeaviest,
        Stage::PerManufacturer,
        Stage::PerYear,
        Stage::Save,
    ];

    /// What the stage is doing, for log lines like "... while {activity}"
    pub fn activity(self) -> &'static str {
        match self {
            Stage::Load => "loading the data",
            Stage::Preview => "displaying the data",
            Stage::UniqueCars => "counting unique cars",
            Stage::AverageHorsepower => "calculating the average horse power",
            Stage::TopHeaviest => "ranking the data in the weight column",
            Stage::PerManufacturer => "counting the cars per manufacturer",
            Stage::PerYear => "counting the cars manufactured per year",
            Stage::Save => "saving the data",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Preview => "preview",
            Stage::UniqueCars => "unique_cars",
            Stage::AverageHorsepower => "average_horsepower",
            Stage::TopHeaviest => "top_heaviest",
            Stage::PerManufacturer => "per_manufacturer",
            Stage::PerYear => "per_year",
            Stage::Save => "save",
        };
        f.write_str(name)
    }
}

/// How a single stage ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StageOutcome {
    Ok,
    Failed(String),
}

impl StageOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::Ok)
    }
}

/// Outcome of every stage of a completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub stages: Vec<(Stage, StageOutcome)>,
}

impl RunSummary {
    pub fn record(&mut self, stage: Stage, outcome: StageOutcome) {
        self.stages.push((stage, outcome));
    }

    pub fn failed(&self) -> usize {
        self.stages.iter().filter(|(_, o)| !o.is_ok()).count()
    }
}
