//! Aggregations over the car table
//!
//! Every function names the columns it needs, checks them up front, and
//! returns a [`StatsError`] instead of producing a partial answer.

use crate::table::{BadCell, CarTable, CellKey, Column, ColumnKind};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("no data has been loaded")]
    NoData,

    #[error("missing column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{column}' holds a {kind} value at row {row}")]
    TypeMismatch {
        column: String,
        row: usize,
        kind: ColumnKind,
    },

    #[error("column '{column}' has no values")]
    EmptyColumn { column: String },

    #[error("{0}")]
    Other(String),
}

impl StatsError {
    fn mismatch(column: &Column, bad: BadCell) -> Self {
        StatsError::TypeMismatch {
            column: column.name().to_string(),
            row: bad.row,
            kind: bad.kind,
        }
    }
}

fn require<'t>(table: &'t CarTable, names: &[&str]) -> Result<Vec<&'t Column>, StatsError> {
    table.require(names).map_err(StatsError::MissingColumns)
}

fn require_one<'t>(table: &'t CarTable, name: &str) -> Result<&'t Column, StatsError> {
    table
        .column(name)
        .ok_or_else(|| StatsError::MissingColumns(vec![name.to_string()]))
}

/// Number of rows that are distinct on `subset`, keeping first occurrences
pub fn unique_count(table: &CarTable, subset: &[&str]) -> Result<usize, StatsError> {
    let columns = require(table, subset)?;

    let keyed: Vec<Vec<CellKey>> = columns
        .iter()
        .map(|c| c.keys().map_err(|bad| StatsError::mismatch(c, bad)))
        .collect::<Result<_, _>>()?;

    let mut seen: HashSet<Vec<CellKey>> = HashSet::with_capacity(table.len());
    for row in 0..table.len() {
        let key: Vec<CellKey> = keyed.iter().map(|keys| keys[row].clone()).collect();
        seen.insert(key);
    }

    Ok(seen.len())
}

/// Arithmetic mean of the present cells of `column`
pub fn mean(table: &CarTable, column: &str) -> Result<f64, StatsError> {
    let column = require_one(table, column)?;
    let values = column
        .numbers()
        .map_err(|bad| StatsError::mismatch(column, bad))?;

    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Err(StatsError::EmptyColumn {
            column: column.name().to_string(),
        });
    }

    let mean = sum / count as f64;
    if !mean.is_finite() {
        return Err(StatsError::Other(format!(
            "mean of '{}' is not finite",
            column.name()
        )));
    }

    Ok(mean)
}

/// Row indices of the `n` largest values of `column`, largest first.
/// Absent cells are skipped and ties keep their original row order.
pub fn nlargest(table: &CarTable, n: usize, column: &str) -> Result<Vec<usize>, StatsError> {
    let column = require_one(table, column)?;
    let values = column
        .numbers()
        .map_err(|bad| StatsError::mismatch(column, bad))?;

    let mut ranked: Vec<(usize, f64)> = values
        .into_iter()
        .enumerate()
        .filter_map(|(row, v)| v.map(|v| (row, v)))
        .collect();

    // Stable sort, so earlier rows win ties
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);

    Ok(ranked.into_iter().map(|(row, _)| row).collect())
}

/// Count rows per distinct value of `column`, most frequent first. Ties keep
/// the order in which values first appear; absent cells are not counted.
pub fn value_counts(table: &CarTable, column: &str) -> Result<Vec<(Value, usize)>, StatsError> {
    let column = require_one(table, column)?;
    let keys = column
        .keys()
        .map_err(|bad| StatsError::mismatch(column, bad))?;

    let mut slots: HashMap<CellKey, usize> = HashMap::new();
    let mut counts: Vec<(Value, usize)> = Vec::new();

    for (row, key) in keys.into_iter().enumerate() {
        if key == CellKey::Absent {
            continue;
        }
        match slots.get(&key) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                let value = column.get(row).cloned().unwrap_or(Value::Null);
                slots.insert(key, counts.len());
                counts.push((value, 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}
