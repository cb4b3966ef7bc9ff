//! The car data pipeline
//!
//! [`CarData`] owns the loaded table and an output sink. Each stage method
//! computes its full text first and writes it to the sink in one go, so a
//! failing stage prints nothing and only leaves an error in the log.

use crate::stats::{self, StatsError};
use crate::table::{self, render, CarTable, LoadError, PersistError};
use crate::types::{AnalyzerConfig, RunSummary, Stage, StageOutcome};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, error, info};

/// Columns that identify a car when counting unique cars
pub const UNIQUE_KEY: [&str; 3] = ["make", "model", "year"];

/// Columns listed for the heaviest cars
const HEAVIEST_COLUMNS: [&str; 3] = ["make", "model", "weight"];

pub struct CarData<W: Write> {
    config: AnalyzerConfig,
    data: Option<CarTable>,
    out: W,
}

impl CarData<io::Stdout> {
    /// Pipeline printing to standard output
    pub fn new(config: AnalyzerConfig) -> Self {
        CarData::with_sink(config, io::stdout())
    }
}

impl<W: Write> CarData<W> {
    pub fn with_sink(config: AnalyzerConfig, out: W) -> Self {
        CarData {
            config,
            data: None,
            out,
        }
    }

    pub fn table(&self) -> Option<&CarTable> {
        self.data.as_ref()
    }

    pub fn into_sink(self) -> W {
        self.out
    }

    /// Load the configured source. A failure is logged and returned; the
    /// previously loaded table, if any, is left in place.
    pub fn load_car_data(&mut self) -> Result<(), LoadError> {
        match table::load_path(&self.config.input, &self.config.records_key) {
            Ok(table) => {
                info!(
                    "Data loaded successfully from {} ({} rows, {} columns)",
                    self.config.input.display(),
                    table.len(),
                    table.columns().len()
                );
                for (name, kind) in table.describe() {
                    debug!("column {}: {}", name, kind);
                }
                self.data = Some(table);
                Ok(())
            }
            Err(err) => {
                error!("{} error occurred while loading the data.", err);
                Err(err)
            }
        }
    }

    /// Print the first rows of the table. Without data this only logs.
    pub fn display_data(&mut self) -> StageOutcome {
        let Some(table) = self.data.as_ref() else {
            info!("No data has been loaded and cannot be displayed.");
            return StageOutcome::Ok;
        };

        let columns: Vec<_> = table.columns().iter().collect();
        let text = render::render_frame(&columns, &table.head(self.config.preview_rows));
        self.emit(Stage::Preview, Ok(text))
    }

    pub fn print_unique_cars(&mut self) -> StageOutcome {
        let result = self.loaded().and_then(|table| {
            let count = stats::unique_count(table, &UNIQUE_KEY)?;
            Ok(format!("Number of unique cars: {}\n", count))
        });
        self.emit(Stage::UniqueCars, result)
    }

    pub fn print_avg_horsepower(&mut self) -> StageOutcome {
        let result = self.loaded().and_then(|table| {
            let avg = stats::mean(table, "horse_power")?;
            Ok(format!("Average horsepower of cars: {:.2}\n", avg))
        });
        self.emit(Stage::AverageHorsepower, result)
    }

    pub fn print_top_heaviest_cars(&mut self) -> StageOutcome {
        let n = self.config.top_n;
        let result = self.loaded().and_then(|table| {
            let columns = table
                .require(&HEAVIEST_COLUMNS)
                .map_err(StatsError::MissingColumns)?;
            let rows = stats::nlargest(table, n, "weight")?;
            Ok(format!(
                "Top {} heaviest cars:\n{}",
                n,
                render::render_frame(&columns, &rows)
            ))
        });
        self.emit(Stage::TopHeaviest, result)
    }

    pub fn print_cars_per_manufacturer(&mut self) -> StageOutcome {
        self.print_counts(Stage::PerManufacturer, "make", "Number of cars per manufacturer:")
    }

    pub fn print_cars_per_year(&mut self) -> StageOutcome {
        self.print_counts(Stage::PerYear, "year", "Number of cars per production year:")
    }

    fn print_counts(&mut self, stage: Stage, column: &str, title: &str) -> StageOutcome {
        let result = self.loaded().and_then(|table| {
            let counts = stats::value_counts(table, column)?;
            Ok(format!("{}\n{}", title, render::render_counts(column, &counts)))
        });
        self.emit(stage, result)
    }

    /// Save the table as CSV to `output`, or to the configured path
    pub fn save_to_csv(&self, output: Option<&Path>) -> StageOutcome {
        let path = output.unwrap_or(self.config.output.as_path());

        let result = match self.data.as_ref() {
            Some(table) => table::save_table(table, path),
            None => Err(PersistError::NoData),
        };

        match result {
            Ok(()) => {
                info!("Data saved to {}", path.display());
                StageOutcome::Ok
            }
            Err(err) => {
                match &err {
                    PersistError::Io { .. } => {
                        error!("Failed to save data to {}: {}", path.display(), err)
                    }
                    _ => error!("{} error occurred while saving the data", err),
                }
                StageOutcome::Failed(err.to_string())
            }
        }
    }

    /// Run every stage in order. Only a load failure stops the run.
    pub fn run_all(&mut self) -> Result<RunSummary, LoadError> {
        let mut summary = RunSummary::default();

        self.load_car_data()?;
        summary.record(Stage::Load, StageOutcome::Ok);

        summary.record(Stage::Preview, self.display_data());
        summary.record(Stage::UniqueCars, self.print_unique_cars());
        summary.record(Stage::AverageHorsepower, self.print_avg_horsepower());
        summary.record(Stage::TopHeaviest, self.print_top_heaviest_cars());
        summary.record(Stage::PerManufacturer, self.print_cars_per_manufacturer());
        summary.record(Stage::PerYear, self.print_cars_per_year());
        summary.record(Stage::Save, self.save_to_csv(None));

        Ok(summary)
    }

    fn loaded(&self) -> Result<&CarTable, StatsError> {
        self.data.as_ref().ok_or(StatsError::NoData)
    }

    /// Write a stage's text to the sink, or log why there is none
    fn emit(&mut self, stage: Stage, result: Result<String, StatsError>) -> StageOutcome {
        let err = match result {
            Ok(text) => match self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
                Ok(()) => return StageOutcome::Ok,
                Err(io_err) => StatsError::Other(format!("failed to write output: {}", io_err)),
            },
            Err(err) => err,
        };

        log_failure(stage, &err);
        StageOutcome::Failed(err.to_string())
    }
}

fn log_failure(stage: Stage, err: &StatsError) {
    match err {
        StatsError::NoData => {
            error!("No data has been loaded; skipped {}", stage.activity())
        }
        StatsError::MissingColumns(columns) => error!(
            "The car data does not contain the expected column(s) for {}: {}",
            stage,
            columns.join(", ")
        ),
        StatsError::TypeMismatch { .. } => {
            error!("Encountered a data type error while {}: {}", stage.activity(), err)
        }
        StatsError::EmptyColumn { .. } => {
            error!("Nothing to aggregate while {}: {}", stage.activity(), err)
        }
        StatsError::Other(_) => {
            error!("{} error occurred while {}", err, stage.activity())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;
    use serde_json::{json, Value};
    use std::path::PathBuf;

    fn sample() -> Value {
        json!({
            "cars": [
                {"make": "Toyota", "model": "Corolla", "year": 2005, "horse_power": 100, "weight": 1500},
                {"make": "Ford", "model": "Fusion", "year": 2007, "horse_power": 110, "weight": 1600},
                {"make": "Chevrolet", "model": "Malibu", "year": 2005, "horse_power": 120, "weight": 1500}
            ]
        })
    }

    fn write_source(dir: &Path, doc: &Value) -> AnalyzerConfig {
        let input = dir.join("cars.txt");
        std::fs::write(&input, doc.to_string()).unwrap();
        AnalyzerConfig {
            input,
            output: dir.join("cars.csv"),
            ..AnalyzerConfig::default()
        }
    }

    fn loaded(doc: &Value) -> (tempfile::TempDir, CarData<Vec<u8>>) {
        let dir = tempfile::tempdir().unwrap();
        let config = write_source(dir.path(), doc);
        let mut cars = CarData::with_sink(config, Vec::new());
        cars.load_car_data().unwrap();
        (dir, cars)
    }

    fn printed(cars: CarData<Vec<u8>>) -> String {
        String::from_utf8(cars.into_sink()).unwrap()
    }

    #[test]
    fn test_load_car_data() {
        let (_dir, cars) = loaded(&sample());
        let table = cars.table().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column_names(),
            vec!["make", "model", "year", "horse_power", "weight"]
        );
    }

    #[test]
    fn test_failed_reload_keeps_previous_table() {
        let (dir, mut cars) = loaded(&sample());
        std::fs::write(dir.path().join("cars.txt"), "not json").unwrap();

        assert!(cars.load_car_data().is_err());
        assert_eq!(cars.table().unwrap().len(), 3);
    }

    #[test]
    fn test_print_unique_cars() {
        let (_dir, mut cars) = loaded(&sample());
        assert!(cars.print_unique_cars().is_ok());
        assert_eq!(printed(cars), "Number of unique cars: 3\n");
    }

    #[test]
    fn test_print_avg_horsepower() {
        let (_dir, mut cars) = loaded(&sample());
        assert!(cars.print_avg_horsepower().is_ok());
        assert_eq!(printed(cars), "Average horsepower of cars: 110.00\n");
    }

    #[test]
    fn test_print_top_heaviest_cars() {
        let (_dir, mut cars) = loaded(&sample());
        assert!(cars.print_top_heaviest_cars().is_ok());
        assert_eq!(
            printed(cars),
            "Top 5 heaviest cars:\n\
             \x20       make    model  weight\n\
             1       Ford   Fusion    1600\n\
             0     Toyota  Corolla    1500\n\
             2  Chevrolet   Malibu    1500\n"
        );
    }

    #[test]
    fn test_print_counts() {
        let (_dir, mut cars) = loaded(&sample());
        assert!(cars.print_cars_per_manufacturer().is_ok());
        assert!(cars.print_cars_per_year().is_ok());
        assert_eq!(
            printed(cars),
            "Number of cars per manufacturer:\n\
             make\n\
             Toyota       1\n\
             Ford         1\n\
             Chevrolet    1\n\
             Name: count\n\
             Number of cars per production year:\n\
             year\n\
             2005    2\n\
             2007    1\n\
             Name: count\n"
        );
    }

    #[test]
    fn test_display_data_shows_at_most_preview_rows() {
        let cars_json: Vec<Value> = (0..8)
            .map(|i| json!({"make": "Ford", "model": "T", "year": 1900 + i}))
            .collect();
        let (_dir, mut cars) = loaded(&json!({ "cars": cars_json }));

        assert!(cars.display_data().is_ok());
        let text = printed(cars);
        // header plus five rows
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().last().unwrap().starts_with('4'));
    }

    #[test]
    fn test_stages_without_data_print_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalyzerConfig {
            output: dir.path().join("cars.csv"),
            ..AnalyzerConfig::default()
        };
        let mut cars = CarData::with_sink(config, Vec::new());

        assert!(cars.display_data().is_ok());
        assert!(!cars.print_unique_cars().is_ok());
        assert!(!cars.print_top_heaviest_cars().is_ok());
        assert!(!cars.save_to_csv(None).is_ok());
        assert!(!dir.path().join("cars.csv").exists());
        assert_eq!(printed(cars), "");
    }

    #[test]
    fn test_missing_weight_only_skips_heaviest() {
        let doc = json!({
            "cars": [
                {"make": "Toyota", "model": "Corolla", "year": 2005, "horse_power": 100},
                {"make": "Ford", "model": "Fusion", "year": 2007, "horse_power": 110}
            ]
        });
        let (dir, mut cars) = loaded(&doc);

        let outcome = cars.print_top_heaviest_cars();
        assert_eq!(
            outcome,
            StageOutcome::Failed("missing column(s): weight".to_string())
        );
        assert!(cars.print_unique_cars().is_ok());
        assert!(cars.print_avg_horsepower().is_ok());
        assert!(cars.print_cars_per_manufacturer().is_ok());
        assert!(cars.print_cars_per_year().is_ok());
        assert!(cars.save_to_csv(None).is_ok());
        assert!(dir.path().join("cars.csv").exists());

        let text = printed(cars);
        assert!(!text.contains("heaviest"));
        assert!(text.starts_with("Number of unique cars: 2\n"));
    }

    #[test]
    fn test_non_numeric_horsepower_prints_nothing() {
        let doc = json!({"cars": [{"horse_power": "fast"}]});
        let (_dir, mut cars) = loaded(&doc);

        assert!(!cars.print_avg_horsepower().is_ok());
        assert_eq!(printed(cars), "");
    }

    #[test]
    fn test_missing_horse_power_prints_nothing() {
        let doc = json!({"cars": [{"make": "Ford", "model": "Fusion", "year": 2007}]});
        let (_dir, mut cars) = loaded(&doc);

        assert_eq!(
            cars.print_avg_horsepower(),
            StageOutcome::Failed(
                StatsError::MissingColumns(vec!["horse_power".into()]).to_string()
            )
        );
        assert_eq!(printed(cars), "");
    }

    #[test]
    fn test_heaviest_needs_make_and_model_too() {
        let doc = json!({"cars": [{"weight": 1500}, {"weight": 1600}]});
        let (_dir, mut cars) = loaded(&doc);

        assert_eq!(
            cars.print_top_heaviest_cars(),
            StageOutcome::Failed(
                StatsError::MissingColumns(vec!["make".into(), "model".into()]).to_string()
            )
        );
        assert_eq!(printed(cars), "");
    }

    #[test]
    fn test_failed_counts_suppress_title() {
        let doc = json!({
            "cars": [
                {"make": ["Ford", "Lincoln"], "model": "Fusion"},
                {"make": "Toyota", "model": "Corolla"}
            ]
        });
        let (_dir, mut cars) = loaded(&doc);

        assert_eq!(
            cars.print_cars_per_year(),
            StageOutcome::Failed(StatsError::MissingColumns(vec!["year".into()]).to_string())
        );
        assert_eq!(
            cars.print_cars_per_manufacturer(),
            StageOutcome::Failed(
                StatsError::TypeMismatch {
                    column: "make".into(),
                    row: 0,
                    kind: ColumnKind::Array,
                }
                .to_string()
            )
        );
        assert_eq!(printed(cars), "");
    }

    #[test]
    fn test_save_to_csv_override_path() {
        let (dir, cars) = loaded(&sample());
        let other = dir.path().join("other.csv");

        assert!(cars.save_to_csv(Some(other.as_path())).is_ok());
        assert!(other.exists());
        assert!(!dir.path().join("cars.csv").exists());
    }

    #[test]
    fn test_save_to_csv_bad_path_is_not_fatal() {
        let (_dir, cars) = loaded(&sample());
        let bad = PathBuf::from("/nonexistent-dir/for/sure/cars.csv");
        assert!(!cars.save_to_csv(Some(bad.as_path())).is_ok());
    }
}
