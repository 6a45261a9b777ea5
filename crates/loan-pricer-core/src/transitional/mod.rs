//! Short-term investor loans priced off a shared transitional rate sheet.

pub mod rate_sheet;

#[cfg(feature = "fix_flip")]
pub mod fix_flip;

#[cfg(feature = "bridge")]
pub mod bridge;

#[cfg(feature = "construction")]
pub mod construction;

pub use rate_sheet::{LoanCosts, OriginationTier, TransitionalLimits, TransitionalRateSheet};

#[cfg(feature = "fix_flip")]
pub use fix_flip::{FixFlipPricing, FixFlipQuote, FixFlipScenario, RehabSeverity};

#[cfg(feature = "bridge")]
pub use bridge::{BridgePricing, BridgeQuote, BridgeScenario};

#[cfg(feature = "construction")]
pub use construction::{ConstructionPricing, ConstructionQuote, ConstructionScenario};
