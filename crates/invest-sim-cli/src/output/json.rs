use serde_json::Value;
use std::io::Write;

use super::OutputResult;

/// Pretty JSON, newline terminated.
pub fn write_json<W: Write>(out: &mut W, value: &Value) -> OutputResult {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pretty_and_terminated() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({ "result": { "rank": "A" } })).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"result\""));
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back["result"]["rank"], "A");
    }
}
