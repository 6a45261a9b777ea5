use serde_json::Value;

use super::format_cell;

/// Print just the key answer from the output.
///
/// A rejected scenario prints its first error. Otherwise look for the
/// headline fields in order of priority, then fall back to the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let Value::Object(map) = value else {
        return format_cell(value);
    };

    if map.get("valid").and_then(|v| v.as_bool()) == Some(false) {
        return map
            .get("errors")
            .and_then(|errors| errors.get(0))
            .map(format_cell)
            .unwrap_or_else(|| "invalid".to_string());
    }

    // Priority list of key output fields
    let priority_keys = ["final_rate", "total_loan", "loan_amount"];
    for key in &priority_keys {
        if let Some(val) = map.get(*key) {
            if !val.is_null() {
                return format_cell(val);
            }
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_cell(val)),
        None => String::new(),
    }
}
