use crate::table::column::{Column, ColumnKind};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// The in-memory car table: named columns of equal length, in the order
/// their keys were first seen in the source records.
#[derive(Debug, Clone, Default)]
pub struct CarTable {
    columns: Vec<Column>,
    rows: usize,
}

impl CarTable {
    /// Build a table from flat records. Keys missing from a record leave an
    /// absent cell, and `null` values are treated the same way.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let rows = records.len();
        let mut names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut cells: Vec<Vec<Option<Value>>> = Vec::new();

        for (row, record) in records.into_iter().enumerate() {
            for (key, value) in record {
                let pos = match positions.get(&key) {
                    Some(&pos) => pos,
                    None => {
                        let pos = names.len();
                        positions.insert(key.clone(), pos);
                        names.push(key);
                        cells.push(vec![None; rows]);
                        pos
                    }
                };

                if !value.is_null() {
                    cells[pos][row] = Some(value);
                }
            }
        }

        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, cells)| Column::new(name, cells))
            .collect();

        CarTable { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up several columns at once. On failure every missing name is
    /// returned, in the order requested.
    pub fn require(&self, names: &[&str]) -> Result<Vec<&Column>, Vec<String>> {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();

        for name in names {
            match self.column(name) {
                Some(column) => found.push(column),
                None => missing.push(name.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            Err(missing)
        }
    }

    /// Row indices of the first `n` rows
    pub fn head(&self, n: usize) -> Vec<usize> {
        (0..self.rows.min(n)).collect()
    }

    pub fn describe(&self) -> Vec<(&str, ColumnKind)> {
        self.columns.iter().map(|c| (c.name(), c.kind())).collect()
    }
}
