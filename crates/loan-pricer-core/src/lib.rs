pub mod coerce;
pub mod config;
pub mod engine;
pub mod error;
pub mod pricing;
pub mod types;

#[cfg(feature = "dscr")]
pub mod rental;

#[cfg(any(feature = "fix_flip", feature = "bridge", feature = "construction"))]
pub mod transitional;

pub use config::PricingConfig;
pub use engine::{price_json, price_value, PricingEngine};
pub use error::PricingError;
pub use types::*;

/// Standard result type for the engines' internal pipelines
pub type LoanPricerResult<T> = Result<T, PricingError>;
