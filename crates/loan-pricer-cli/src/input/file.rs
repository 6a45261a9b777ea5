use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Document formats accepted for scenarios and rate sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from the file extension; anything unrecognised is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }

    /// Guess the format of an unnamed document, such as piped input.
    /// JSON documents open with an object or array; everything else is YAML.
    pub fn sniff(contents: &str) -> Self {
        match contents.trim_start().chars().next() {
            Some('{') | Some('[') => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// Read a JSON or YAML file, chosen by extension, into a typed struct.
pub fn read_document<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_document(&contents, DocumentFormat::from_path(&canonical))
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e).into())
}

pub fn parse_document<T: DeserializeOwned>(
    contents: &str,
    format: DocumentFormat,
) -> Result<T, Box<dyn std::error::Error>> {
    let value = match format {
        DocumentFormat::Json => serde_json::from_str(contents)?,
        DocumentFormat::Yaml => serde_yaml::from_str(contents)?,
    };
    Ok(value)
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("sheet.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("sheet.YML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("sheet.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("sheet")), DocumentFormat::Json);
    }

    #[test]
    fn test_sniff_unnamed_documents() {
        assert_eq!(DocumentFormat::sniff("  {\"fico\": 700}"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::sniff("[1, 2]"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::sniff("fico: 700\nloan_amount: 225000"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::sniff("---\nfico: 700"), DocumentFormat::Yaml);
    }

    #[test]
    fn test_yaml_and_json_parse_alike() {
        let yaml: Value = parse_document("fico: 720\nloanAmount: 250000\n", DocumentFormat::Yaml).unwrap();
        let json: Value =
            parse_document(r#"{"fico": 720, "loanAmount": 250000}"#, DocumentFormat::Json).unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_missing_file() {
        let err = read_document::<Value>("definitely/not/here.json").unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }
}
