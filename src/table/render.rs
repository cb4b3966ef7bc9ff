//! Plain-text rendering of table slices and count series for the terminal

use crate::table::column::{Column, ColumnKind};
use serde_json::Value;
use std::fmt::Write;

/// Text shown for a cell, `NaN` when absent
pub fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => "NaN".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Cell text within a column of `kind`. Integral values in a column that
/// also holds fractional numbers are shown as floats (`1500.0`).
pub fn column_cell_text(cell: Option<&Value>, kind: ColumnKind) -> String {
    match cell {
        Some(Value::Number(n)) if kind == ColumnKind::Number && !n.is_f64() => {
            format!("{}.0", n)
        }
        _ => cell_text(cell),
    }
}

/// Render `rows` of the given columns as an aligned grid with a leading
/// row-index column. Rows keep their original index labels.
pub fn render_frame(columns: &[&Column], rows: &[usize]) -> String {
    let mut out = String::new();

    if rows.is_empty() {
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        let _ = writeln!(out, "Empty DataFrame");
        let _ = writeln!(out, "Columns: [{}]", names.join(", "));
        let _ = writeln!(out, "Index: []");
        return out;
    }

    let labels: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    let label_width = labels.iter().map(String::len).max().unwrap_or(0);

    let grid: Vec<Vec<String>> = columns
        .iter()
        .map(|c| rows.iter().map(|&r| column_cell_text(c.get(r), c.kind())).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .zip(&grid)
        .map(|(column, cells)| {
            cells
                .iter()
                .map(|s| s.chars().count())
                .chain(std::iter::once(column.name().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    out.push_str(&" ".repeat(label_width));
    for (column, width) in columns.iter().zip(&widths) {
        let _ = write!(out, "  {:>width$}", column.name(), width = width);
    }
    out.push('\n');

    for (i, label) in labels.iter().enumerate() {
        let _ = write!(out, "{:<width$}", label, width = label_width);
        for (cells, width) in grid.iter().zip(&widths) {
            let _ = write!(out, "  {:>width$}", cells[i], width = width);
        }
        out.push('\n');
    }

    out
}

/// Render a count series: the column name, one `value  count` line per
/// entry, and a closing `Name: count` line.
pub fn render_counts(name: &str, counts: &[(Value, usize)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", name);

    let labels: Vec<String> = counts.iter().map(|(v, _)| cell_text(Some(v))).collect();
    let label_width = labels.iter().map(|s| s.chars().count()).max().unwrap_or(0);
    let count_width = counts
        .iter()
        .map(|(_, n)| n.to_string().len())
        .max()
        .unwrap_or(0);

    for (label, (_, count)) in labels.iter().zip(counts) {
        let _ = writeln!(
            out,
            "{:<lw$}    {:>cw$}",
            label,
            count,
            lw = label_width,
            cw = count_width
        );
    }

    let _ = writeln!(out, "Name: count");
    out
}
