use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_pricer_core::{price_value, PricingConfig};

use super::{scenario_input, ScenarioFlags};

/// Arguments for a DSCR rental quote
#[derive(Args)]
pub struct DscrArgs {
    /// Path to a JSON or YAML scenario (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrower FICO score
    #[arg(long)]
    pub fico: Option<u32>,

    /// Appraised property value
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Requested loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Property type label, e.g. "Detached SFR" or "2-4 Unit"
    #[arg(long)]
    pub property_type: Option<String>,

    /// Loan purpose, e.g. "Purchase" or "Cash-Out Refi"
    #[arg(long)]
    pub purpose: Option<String>,

    /// Interest-only period, e.g. "No IO" or "5Y IO"
    #[arg(long)]
    pub io_option: Option<String>,

    /// Prepayment penalty, e.g. "5y (5% Flat)"
    #[arg(long, alias = "ppp")]
    pub prepay_option: Option<String>,

    /// Gross monthly rent
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Annual property taxes
    #[arg(long)]
    pub annual_taxes: Option<Decimal>,

    /// Annual hazard insurance
    #[arg(long)]
    pub annual_insurance: Option<Decimal>,

    /// Annual HOA dues
    #[arg(long)]
    pub annual_hoa: Option<Decimal>,

    /// Amortization term in years
    #[arg(long)]
    pub term_years: Option<u32>,
}

impl DscrArgs {
    fn flags(&self) -> ScenarioFlags {
        ScenarioFlags::default()
            .count("fico", self.fico)
            .money("property_value", self.property_value)
            .money("loan_amount", self.loan_amount)
            .choice("property_type", self.property_type.clone())
            .choice("purpose", self.purpose.clone())
            .choice("io_option", self.io_option.clone())
            .choice("prepay_option", self.prepay_option.clone())
            .money("monthly_rent", self.monthly_rent)
            .money("annual_taxes", self.annual_taxes)
            .money("annual_insurance", self.annual_insurance)
            .money("annual_hoa", self.annual_hoa)
            .count("term_years", self.term_years)
    }
}

pub fn run_dscr(args: DscrArgs, config: &PricingConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = scenario_input(args.input.as_deref(), args.flags())?;
    let result = price_value(&config.dscr, scenario);
    Ok(serde_json::to_value(result)?)
}
