use serde::{Deserialize, Serialize};

use crate::LoanPricerResult;

#[cfg(feature = "dscr")]
use crate::rental::DscrPricing;
#[cfg(feature = "bridge")]
use crate::transitional::BridgePricing;
#[cfg(feature = "construction")]
use crate::transitional::ConstructionPricing;
#[cfg(feature = "fix_flip")]
use crate::transitional::FixFlipPricing;

/// Rate sheets for every enabled product.
///
/// `Default` is the current pricing epoch. A sheet loaded from a document
/// may name only some products; the rest keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    #[cfg(feature = "dscr")]
    pub dscr: DscrPricing,
    #[cfg(feature = "fix_flip")]
    pub fix_flip: FixFlipPricing,
    #[cfg(feature = "bridge")]
    pub bridge: BridgePricing,
    #[cfg(feature = "construction")]
    pub construction: ConstructionPricing,
}

impl PricingConfig {
    /// Parse a JSON rate sheet and check it before use.
    pub fn from_json_str(input: &str) -> LoanPricerResult<Self> {
        let config: PricingConfig = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LoanPricerResult<()> {
        #[cfg(feature = "dscr")]
        self.dscr.validate()?;
        #[cfg(feature = "fix_flip")]
        self.fix_flip.validate()?;
        #[cfg(feature = "bridge")]
        self.bridge.validate()?;
        #[cfg(feature = "construction")]
        self.construction.validate()?;
        Ok(())
    }
}
