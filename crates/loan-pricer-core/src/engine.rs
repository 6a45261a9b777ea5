use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PricingError;
use crate::types::PricingResult;

/// A loan product priced from an injected rate sheet.
///
/// Implemented by each product's pricing configuration, so the sheet a
/// caller holds is also the engine it prices with.
pub trait PricingEngine {
    type Scenario: DeserializeOwned;
    type Quote: Serialize;

    /// Display name used in messages and log events
    const PRODUCT: &'static str;

    fn price(&self, scenario: &Self::Scenario) -> PricingResult<Self::Quote>;
}

/// Price a scenario held as loose JSON. A scenario that cannot be read is
/// returned as an `Invalid` result rather than an error.
pub fn price_value<E: PricingEngine>(
    engine: &E,
    value: serde_json::Value,
) -> PricingResult<E::Quote> {
    match serde_json::from_value::<E::Scenario>(value) {
        Ok(scenario) => engine.price(&scenario),
        Err(e) => PricingResult::rejected(
            E::PRODUCT,
            PricingError::InvalidScenario(e.to_string()),
            Vec::new(),
        ),
    }
}

/// Same as [`price_value`] for a raw JSON document.
pub fn price_json<E: PricingEngine>(engine: &E, input: &str) -> PricingResult<E::Quote> {
    match serde_json::from_str::<E::Scenario>(input) {
        Ok(scenario) => engine.price(&scenario),
        Err(e) => PricingResult::rejected(
            E::PRODUCT,
            PricingError::InvalidScenario(e.to_string()),
            Vec::new(),
        ),
    }
}
