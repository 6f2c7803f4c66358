pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use serde_json::Value;
use std::io::{self, Write};
use thiserror::Error;

use crate::OutputFormat;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OutputResult = Result<(), OutputError>;

/// Keys under which simulation and amortisation results carry their yearly rows.
const SERIES_KEYS: [&str; 2] = ["long_term_projection", "years"];

/// Command output split into the body and the envelope notes around it.
/// `region`, `rank` and `simulate --dashboard` return a bare body.
pub struct Rendered<'a> {
    pub body: &'a Value,
    pub warnings: Vec<&'a str>,
    pub methodology: Option<&'a str>,
}

impl<'a> Rendered<'a> {
    pub fn of(value: &'a Value) -> Self {
        let Some(body) = value.get("result") else {
            return Self {
                body: value,
                warnings: Vec::new(),
                methodology: None,
            };
        };
        let warnings = value
            .get("warnings")
            .and_then(Value::as_array)
            .map(|ws| ws.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        Self {
            body,
            warnings,
            methodology: value.get("methodology").and_then(Value::as_str),
        }
    }

    /// The yearly series in the body, if it has one.
    pub fn series(&self) -> Option<(&'static str, &'a [Value])> {
        SERIES_KEYS.iter().find_map(|key| {
            self.body
                .get(*key)
                .and_then(Value::as_array)
                .map(|rows| (*key, rows.as_slice()))
        })
    }
}

/// Rows of objects, as opposed to a list of scalars.
pub fn is_series(value: &Value) -> bool {
    matches!(value, Value::Array(rows) if rows.first().is_some_and(Value::is_object))
}

/// One-cell rendering of a JSON value. Decimal strings pass through as written.
pub fn cell(value: &Value, null: &str) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => null.to_string(),
        Value::Array(items) if !is_series(value) => items
            .iter()
            .map(|v| cell(v, null))
            .collect::<Vec<_>>()
            .join(", "),
        _ => value.to_string(),
    }
}

/// Write `value` to stdout in the requested format.
pub fn format_output(format: &OutputFormat, value: &Value) -> OutputResult {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => json::write_json(&mut out, value)?,
        OutputFormat::Table => table::write_table(&mut out, value)?,
        OutputFormat::Csv => csv_out::write_csv(&mut out, value)?,
        OutputFormat::Minimal => minimal::write_minimal(&mut out, value)?,
    }
    out.flush()?;
    Ok(())
}
