use serde_json::Value;
use std::io::Write;

use super::{cell, OutputResult, Rendered};

/// Headline figures per command, in print order: the simulation's rank and
/// funded loan, the region, the loan's debt service, the rank lookup.
const HEADLINES: [&str; 6] = [
    "rank",
    "estimated_loan_amount",
    "region",
    "annual_debt_service",
    "monthly_payment",
    "score",
];

/// The headline figures as `key=value` on one line; a body with none of them
/// prints its first field.
pub fn write_minimal<W: Write>(out: &mut W, value: &Value) -> OutputResult {
    let view = Rendered::of(value);
    let Value::Object(map) = view.body else {
        writeln!(out, "{}", cell(view.body, "null"))?;
        return Ok(());
    };

    let headline: Vec<String> = HEADLINES
        .iter()
        .filter_map(|key| {
            map.get(*key)
                .filter(|v| !v.is_null())
                .map(|v| format!("{key}={}", cell(v, "null")))
        })
        .collect();

    if !headline.is_empty() {
        writeln!(out, "{}", headline.join(" "))?;
    } else if let Some((key, val)) = map.iter().next() {
        writeln!(out, "{key}={}", cell(val, "null"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_of(value: &Value) -> String {
        let mut buf = Vec::new();
        write_minimal(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_simulation_headline() {
        let value = json!({ "result": {
            "region": "Chunanbu",
            "rank": "B",
            "estimated_loan_amount": "28650",
            "dscr": "1.40",
        }});
        assert_eq!(minimal_of(&value), "rank=B estimated_loan_amount=28650 region=Chunanbu\n");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        assert_eq!(minimal_of(&json!({ "cities": ["那覇市"] })), "cities=那覇市\n");
    }
}
