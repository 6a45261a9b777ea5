use clap::{Args, ValueEnum};
use serde_json::Value;

use loan_pricer_core::PricingConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Product {
    Dscr,
    FixFlip,
    Bridge,
    Construction,
}

/// Arguments for printing the active rate sheet
#[derive(Args)]
pub struct RateSheetArgs {
    /// Print a single product's sheet
    #[arg(long)]
    pub product: Option<Product>,
}

pub fn run_rate_sheet(
    args: RateSheetArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let value = match args.product {
        None => serde_json::to_value(config)?,
        Some(Product::Dscr) => serde_json::to_value(&config.dscr)?,
        Some(Product::FixFlip) => serde_json::to_value(&config.fix_flip)?,
        Some(Product::Bridge) => serde_json::to_value(&config.bridge)?,
        Some(Product::Construction) => serde_json::to_value(&config.construction)?,
    };
    Ok(value)
}
