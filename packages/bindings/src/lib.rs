use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use loan_pricer_core::{price_json, PricingConfig, PricingResult};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// The rate sheet passed by the caller, or the current epoch.
fn load_config(config_json: Option<String>) -> NapiResult<PricingConfig> {
    match config_json {
        Some(json) => PricingConfig::from_json_str(&json).map_err(to_napi_error),
        None => Ok(PricingConfig::default()),
    }
}

fn to_json<Q: Serialize>(result: &PricingResult<Q>) -> NapiResult<String> {
    serde_json::to_string(result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Rental
// ---------------------------------------------------------------------------

#[napi]
pub fn price_dscr_loan(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = load_config(config_json)?;
    to_json(&price_json(&config.dscr, &input_json))
}

// ---------------------------------------------------------------------------
// Transitional
// ---------------------------------------------------------------------------

#[napi]
pub fn price_fix_flip_loan(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = load_config(config_json)?;
    to_json(&price_json(&config.fix_flip, &input_json))
}

#[napi]
pub fn price_bridge_loan(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = load_config(config_json)?;
    to_json(&price_json(&config.bridge, &input_json))
}

#[napi]
pub fn price_construction_loan(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let config = load_config(config_json)?;
    to_json(&price_json(&config.construction, &input_json))
}

// ---------------------------------------------------------------------------
// Rate sheet
// ---------------------------------------------------------------------------

#[napi]
pub fn default_rate_sheet() -> NapiResult<String> {
    serde_json::to_string(&PricingConfig::default()).map_err(to_napi_error)
}
