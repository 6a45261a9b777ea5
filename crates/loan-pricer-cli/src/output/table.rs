use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_cell, ENVELOPE_KEYS};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) if map.contains_key("valid") => print_envelope(map),
        Value::Object(map) => print_fields(map.iter()),
        _ => println!("{}", format_cell(value)),
    }
}

fn print_envelope(envelope: &Map<String, Value>) {
    let quote = envelope
        .iter()
        .filter(|(key, _)| !ENVELOPE_KEYS.contains(&key.as_str()));

    if envelope.get("valid").and_then(|v| v.as_bool()) == Some(true) {
        print_fields(quote);
    }

    print_messages("Errors", envelope.get("errors"));
    print_messages("Warnings", envelope.get("warnings"));

    if let Some(Value::String(version)) = envelope.get("metadata").and_then(|m| m.get("version")) {
        println!("\nPricing engine: v{}", version);
    }
}

fn print_fields<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_cell(val)]);
    }
    let table = Table::from(builder);
    println!("{}", table);
}

fn print_messages(heading: &str, messages: Option<&Value>) {
    if let Some(Value::Array(messages)) = messages {
        if !messages.is_empty() {
            println!("\n{}:", heading);
            for m in messages {
                if let Value::String(s) = m {
                    println!("  - {}", s);
                }
            }
        }
    }
}
