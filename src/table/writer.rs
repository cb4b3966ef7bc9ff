use crate::table::frame::CarTable;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no data has been loaded")]
    NoData,

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode CSV for {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PersistError {
    /// Split csv errors into I/O failures and everything else
    fn from_csv(path: &Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            return PersistError::Io {
                path: path.to_path_buf(),
                source: err.into(),
            };
        }

        PersistError::Csv {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Writes a whole table as comma-separated rows: a header of column names,
/// then one line per record. No row index is written.
pub struct CsvTableWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvTableWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(CsvTableWriter::new(file))
    }
}

impl<W: Write> CsvTableWriter<W> {
    pub fn new(writer: W) -> Self {
        CsvTableWriter {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn write_table(&mut self, table: &CarTable) -> Result<(), csv::Error> {
        self.writer.write_record(table.column_names())?;

        let mut record = Vec::with_capacity(table.columns().len());
        for row in 0..table.len() {
            record.clear();
            record.extend(table.columns().iter().map(|c| field_text(c.get(row))));
            self.writer.write_record(&record)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Save `table` to `path`, replacing any existing file
pub fn save_table(table: &CarTable, path: &Path) -> Result<(), PersistError> {
    let mut writer = CsvTableWriter::create(path)?;
    writer
        .write_table(table)
        .map_err(|err| PersistError::from_csv(path, err))?;
    writer.flush().map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn field_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        // Numbers, booleans and nested values use their compact JSON text
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn table(value: Value) -> CarTable {
        let records: Vec<Map<String, Value>> = serde_json::from_value(value).unwrap();
        CarTable::from_records(records)
    }

    #[test]
    fn test_write_table_to_buffer() {
        let table = table(json!([
            {"make": "Toyota", "model": "Corolla", "year": 2005, "weight": 1500.5},
            {"make": "Ford", "model": "Fusion, Sport", "year": 2007},
            {"make": "Say \"Hi\"", "model": "X", "year": 2010, "weight": 900}
        ]));

        let mut buffer = Vec::new();
        {
            let mut writer = CsvTableWriter::new(&mut buffer);
            writer.write_table(&table).unwrap();
            writer.flush().unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(
            output,
            "make,model,year,weight\n\
             Toyota,Corolla,2005,1500.5\n\
             Ford,\"Fusion, Sport\",2007,\n\
             \"Say \"\"Hi\"\"\",X,2010,900\n"
        );
    }

    #[test]
    fn test_save_table_row_count_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.csv");
        let table = table(json!([
            {"make": "Toyota", "model": "Corolla", "year": 2005},
            {"make": "Ford", "model": "Fusion", "year": 2007}
        ]));

        save_table(&table, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["make", "model", "year"]);
        assert_eq!(reader.records().count(), table.len());
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("cars.csv");
        let table = table(json!([{"make": "Toyota"}]));

        let err = save_table(&table, &path).unwrap_err();
        assert!(matches!(err, PersistError::Io { .. }));
    }
}
