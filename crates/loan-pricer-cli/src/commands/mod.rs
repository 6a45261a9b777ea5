pub mod dscr;
pub mod rate_sheet;
pub mod transitional;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use loan_pricer_core::PricingConfig;

use crate::input;

/// Load the rate sheet named by `--config`, or the current epoch.
pub fn load_config(path: Option<&str>) -> Result<PricingConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(PricingConfig::default());
    };
    let config: PricingConfig = input::file::read_document(path)?;
    config.validate()?;
    tracing::debug!(path, "rate sheet loaded");
    Ok(config)
}

/// Scenario fields collected from individual command-line flags.
///
/// Values are passed through as JSON so flag input is coerced exactly like
/// a scenario document.
#[derive(Debug, Default)]
pub struct ScenarioFlags(Map<String, Value>);

impl ScenarioFlags {
    pub fn money(mut self, key: &str, value: Option<Decimal>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_string(), Value::String(v.to_string()));
        }
        self
    }

    pub fn count(mut self, key: &str, value: Option<u32>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_string(), Value::from(v));
        }
        self
    }

    pub fn choice(mut self, key: &str, value: Option<String>) -> Self {
        if let Some(v) = value {
            self.0.insert(key.to_string(), Value::String(v));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Resolve the scenario: `--input` file, then piped stdin, then flags.
pub fn scenario_input(
    path: Option<&str>,
    flags: ScenarioFlags,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_document(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(data);
    }
    if flags.is_empty() {
        return Err("no scenario given (provide --input, pipe JSON or YAML on stdin, or pass scenario flags)".into());
    }
    Ok(Value::Object(flags.0))
}
