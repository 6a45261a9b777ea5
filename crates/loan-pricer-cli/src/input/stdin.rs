use serde_json::Value;
use std::io::{self, Read};

use super::file::{parse_document, DocumentFormat};

/// Read a piped JSON or YAML scenario. `None` when stdin is a terminal.
pub fn read_stdin() -> Result<Option<Value>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

fn parse_piped(buffer: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let document = buffer.trim();
    if document.is_empty() {
        return Ok(None);
    }

    let format = DocumentFormat::sniff(document);
    tracing::debug!(?format, "scenario read from stdin");
    parse_document(document, format)
        .map(Some)
        .map_err(|e| format!("Failed to parse stdin: {}", e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_pipe_is_no_scenario() {
        assert!(parse_piped("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_and_yaml_pipes_agree() {
        let from_json = parse_piped(r#"{"fico": 700, "loanAmount": "225,000"}"#).unwrap();
        let from_yaml = parse_piped("fico: 700\nloanAmount: \"225,000\"\n").unwrap();
        assert_eq!(from_json, Some(json!({"fico": 700, "loanAmount": "225,000"})));
        assert_eq!(from_yaml, from_json);
    }

    #[test]
    fn test_malformed_pipe_is_reported() {
        let err = parse_piped("{\"fico\": ").unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse stdin:"));
    }
}
