use serde_json::Value;
use std::io;

use super::{format_cell, ENVELOPE_KEYS};

/// Write output as two-column CSV (field, value) to stdout.
///
/// Rejection reasons and warnings come first as `error` / `warning` rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = wtr.write_record(["field", "value"]);

    match value {
        Value::Object(map) => {
            for (label, key) in [("error", "errors"), ("warning", "warnings")] {
                if let Some(Value::Array(messages)) = map.get(key) {
                    for message in messages {
                        let _ = wtr.write_record([label, &format_cell(message)]);
                    }
                }
            }
            if let Some(valid) = map.get("valid") {
                let _ = wtr.write_record(["valid", &format_cell(valid)]);
            }
            for (key, val) in map {
                if ENVELOPE_KEYS.contains(&key.as_str()) {
                    continue;
                }
                let _ = wtr.write_record([key.as_str(), &format_cell(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record(["value", &format_cell(value)]);
        }
    }

    let _ = wtr.flush();
}
