use serde_json::Value;
use std::io::Write;

use super::{cell, OutputResult, Rendered};

/// CSV of the result. A simulation or amortisation is written as one row per
/// year; anything else as `field,value` pairs.
pub fn write_csv<W: Write>(out: W, value: &Value) -> OutputResult {
    let mut wtr = csv::Writer::from_writer(out);
    let view = Rendered::of(value);

    if let Some((_, rows)) = view.series() {
        write_rows(&mut wtr, rows)?;
    } else {
        match view.body {
            Value::Object(map) => {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), cell(val, "").as_str()])?;
                }
            }
            Value::Array(rows) => write_rows(&mut wtr, rows)?,
            other => wtr.write_record([cell(other, "")])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Header from the first row's keys, then one record per row.
fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for row in rows {
            wtr.write_record([cell(row, "")])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        wtr.write_record(
            headers
                .iter()
                .map(|h| row.get(*h).map(|v| cell(v, "")).unwrap_or_default()),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn csv_of(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_projection_rows() {
        let value = json!({ "result": {
            "rank": "B",
            "long_term_projection": [
                { "year": 1, "cash_flow": "512.4" },
                { "year": 2, "cash_flow": "515.0" },
            ],
        }});
        let text = csv_of(&value);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let mut first_row: Vec<&str> = lines[1].split(',').collect();
        first_row.sort_unstable();
        assert_eq!(first_row, vec!["1", "512.4"]);
    }

    #[test]
    fn test_field_value_pairs() {
        let text = csv_of(&json!({ "region": "Chunanbu", "cities": ["沖縄市", "うるま市"] }));
        assert!(text.starts_with("field,value\n"));
        assert!(text.contains("region,Chunanbu\n"));
        assert!(text.contains("\"沖縄市, うるま市\""));
    }

    #[test]
    fn test_write_errors_propagate() {
        let value = json!({ "region": "Naha" });
        assert!(write_csv(ClosedPipe, &value).is_err());
    }
}
