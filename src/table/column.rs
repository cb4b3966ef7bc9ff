use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Type identifier for the cells of a column, unified across every present cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
    /// Cells disagree on their type
    Mixed,
}

impl ColumnKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ColumnKind::Null,
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    ColumnKind::Integer
                } else {
                    ColumnKind::Number
                }
            }
            Value::String(_) => ColumnKind::String,
            Value::Array(_) => ColumnKind::Array,
            Value::Object(_) => ColumnKind::Object,
        }
    }

    /// Merge two kinds the way a column widens while scanning its cells.
    /// Integers widen to numbers, nulls give way to anything, everything
    /// else collapses to `Mixed`.
    pub fn unify(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Null, k) | (k, Null) => k,
            (Integer, Number) | (Number, Integer) => Number,
            _ => Mixed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnKind::Null => "null",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Integer => "integer",
            ColumnKind::Number => "number",
            ColumnKind::String => "string",
            ColumnKind::Array => "array",
            ColumnKind::Object => "object",
            ColumnKind::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell that could not be used where a scalar of some kind was required
#[derive(Debug, Clone, PartialEq)]
pub struct BadCell {
    pub row: usize,
    pub kind: ColumnKind,
}

/// Hashable identity of a cell, used for de-duplication and grouping.
///
/// Integral floats compare equal to integers (`2005.0 == 2005`) and absent
/// cells compare equal to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellKey {
    Absent,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(u64),
    Text(String),
}

impl CellKey {
    /// Returns `None` for arrays and objects, which have no usable identity.
    pub fn from_cell(cell: Option<&Value>) -> Option<CellKey> {
        let value = match cell {
            None | Some(Value::Null) => return Some(CellKey::Absent),
            Some(value) => value,
        };

        match value {
            Value::Bool(b) => Some(CellKey::Bool(*b)),
            Value::String(s) => Some(CellKey::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Some(CellKey::Int(i));
                }
                if let Some(u) = n.as_u64() {
                    return Some(CellKey::UInt(u));
                }
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                    Some(CellKey::Int(f as i64))
                } else if f.fract() == 0.0 && f >= 0.0 && f < u64::MAX as f64 {
                    Some(CellKey::UInt(f as u64))
                } else {
                    Some(CellKey::Float(f.to_bits()))
                }
            }
            Value::Array(_) | Value::Object(_) | Value::Null => None,
        }
    }
}

/// A named column of optional cells. `None` marks a cell the record did not carry.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    cells: Vec<Option<Value>>,
    kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Option<Value>>) -> Self {
        let kind = cells
            .iter()
            .flatten()
            .map(ColumnKind::of)
            .fold(ColumnKind::Null, ColumnKind::unify);

        Column {
            name: name.into(),
            cells,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Value> {
        self.cells.get(row).and_then(Option::as_ref)
    }

    /// Read every cell as a number. Absent cells stay `None`; the first
    /// present non-numeric cell is reported as an error.
    pub fn numbers(&self) -> Result<Vec<Option<f64>>, BadCell> {
        self.cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(Value::Number(n)) => Ok(n.as_f64()),
                Some(other) => Err(BadCell {
                    row,
                    kind: ColumnKind::of(other),
                }),
            })
            .collect()
    }

    /// Hashable keys for every cell, failing on the first array or object.
    pub fn keys(&self) -> Result<Vec<CellKey>, BadCell> {
        self.cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                CellKey::from_cell(cell.as_ref()).ok_or_else(|| BadCell {
                    row,
                    kind: cell.as_ref().map(ColumnKind::of).unwrap_or(ColumnKind::Null),
                })
            })
            .collect()
    }
}
