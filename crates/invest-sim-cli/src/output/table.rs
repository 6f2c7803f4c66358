use serde_json::{Map, Value};
use std::io::Write;
use tabled::{builder::Builder, Table};

use super::{cell, is_series, OutputResult, Rendered};

/// Human-readable report: a field/value table of the headline figures, one
/// table per yearly series, then warnings and methodology.
pub fn write_table<W: Write>(out: &mut W, value: &Value) -> OutputResult {
    let view = Rendered::of(value);

    match view.body {
        Value::Object(map) => {
            writeln!(out, "{}", field_table(map))?;
            for (key, val) in map {
                if let Value::Array(rows) = val {
                    if is_series(val) {
                        writeln!(out, "\n{key}:")?;
                        writeln!(out, "{}", row_table(rows))?;
                    }
                }
            }
        }
        Value::Array(rows) if is_series(view.body) => writeln!(out, "{}", row_table(rows))?,
        other => writeln!(out, "{}", cell(other, "-"))?,
    }

    if !view.warnings.is_empty() {
        writeln!(out, "\nWarnings:")?;
        for w in &view.warnings {
            writeln!(out, "  - {w}")?;
        }
    }
    if let Some(m) = view.methodology {
        writeln!(out, "\nMethodology: {m}")?;
    }
    Ok(())
}

/// Scalars and nested objects of the body; series are left to their own tables.
fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map.iter().filter(|(_, v)| !is_series(v)) {
        builder.push_record([key.clone(), cell(val, "-")]);
    }
    Table::from(builder)
}

/// Columns from the first row's keys.
fn row_table(rows: &[Value]) -> Table {
    let mut builder = Builder::default();
    let headers: Vec<String> = rows
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();
    builder.push_record(headers.clone());
    for row in rows {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(|v| cell(v, "-")).unwrap_or_default()),
        );
    }
    Table::from(builder)
}
