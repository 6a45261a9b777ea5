use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_pricer_core::{price_value, PricingConfig};

use super::{scenario_input, ScenarioFlags};

/// Arguments for a fix & flip quote
#[derive(Args)]
pub struct FixFlipArgs {
    /// Path to a JSON or YAML scenario (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrower FICO score
    #[arg(long)]
    pub fico: Option<u32>,

    /// Completed flips in the last 36 months
    #[arg(long)]
    pub experience: Option<u32>,

    /// Purchase price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// As-is value; defaults to the purchase price
    #[arg(long)]
    pub as_is_value: Option<Decimal>,

    /// Rehab budget
    #[arg(long)]
    pub rehab_budget: Option<Decimal>,

    /// After-repair value
    #[arg(long, alias = "arv")]
    pub after_repair_value: Option<Decimal>,

    /// Origination tier index (0 = 0.50 points)
    #[arg(long)]
    pub origination_tier: Option<u32>,

    /// Loan term in months
    #[arg(long)]
    pub loan_term_months: Option<u32>,
}

/// Arguments for a bridge quote
#[derive(Args)]
pub struct BridgeArgs {
    /// Path to a JSON or YAML scenario (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrower FICO score
    #[arg(long)]
    pub fico: Option<u32>,

    /// Completed deals in the last 36 months
    #[arg(long)]
    pub experience: Option<u32>,

    /// Property value
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Requested loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Origination tier index (0 = 0.50 points)
    #[arg(long)]
    pub origination_tier: Option<u32>,

    /// Loan term in months
    #[arg(long)]
    pub loan_term_months: Option<u32>,
}

/// Arguments for a ground-up construction quote
#[derive(Args)]
pub struct ConstructionArgs {
    /// Path to a JSON or YAML scenario (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Borrower FICO score
    #[arg(long)]
    pub fico: Option<u32>,

    /// Completed builds in the last 36 months
    #[arg(long)]
    pub experience: Option<u32>,

    /// Land or lot value
    #[arg(long)]
    pub land_value: Option<Decimal>,

    /// Construction budget
    #[arg(long)]
    pub construction_budget: Option<Decimal>,

    /// Completed (after-built) value
    #[arg(long)]
    pub completed_value: Option<Decimal>,

    /// Origination tier index (0 = 0.50 points)
    #[arg(long)]
    pub origination_tier: Option<u32>,

    /// Loan term in months
    #[arg(long)]
    pub loan_term_months: Option<u32>,
}

impl FixFlipArgs {
    fn flags(&self) -> ScenarioFlags {
        ScenarioFlags::default()
            .count("fico", self.fico)
            .count("experience", self.experience)
            .money("purchase_price", self.purchase_price)
            .money("as_is_value", self.as_is_value)
            .money("rehab_budget", self.rehab_budget)
            .money("after_repair_value", self.after_repair_value)
            .count("origination_tier", self.origination_tier)
            .count("loan_term_months", self.loan_term_months)
    }
}

impl BridgeArgs {
    fn flags(&self) -> ScenarioFlags {
        ScenarioFlags::default()
            .count("fico", self.fico)
            .count("experience", self.experience)
            .money("property_value", self.property_value)
            .money("loan_amount", self.loan_amount)
            .count("origination_tier", self.origination_tier)
            .count("loan_term_months", self.loan_term_months)
    }
}

impl ConstructionArgs {
    fn flags(&self) -> ScenarioFlags {
        ScenarioFlags::default()
            .count("fico", self.fico)
            .count("experience", self.experience)
            .money("land_value", self.land_value)
            .money("construction_budget", self.construction_budget)
            .money("completed_value", self.completed_value)
            .count("origination_tier", self.origination_tier)
            .count("loan_term_months", self.loan_term_months)
    }
}

pub fn run_fix_flip(
    args: FixFlipArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = scenario_input(args.input.as_deref(), args.flags())?;
    let result = price_value(&config.fix_flip, scenario);
    Ok(serde_json::to_value(result)?)
}

pub fn run_bridge(args: BridgeArgs, config: &PricingConfig) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = scenario_input(args.input.as_deref(), args.flags())?;
    let result = price_value(&config.bridge, scenario);
    Ok(serde_json::to_value(result)?)
}

pub fn run_construction(
    args: ConstructionArgs,
    config: &PricingConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = scenario_input(args.input.as_deref(), args.flags())?;
    let result = price_value(&config.construction, scenario);
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flip_flags_reach_the_engine() {
        let args = FixFlipArgs {
            input: None,
            fico: Some(760),
            experience: Some(5),
            purchase_price: Some(dec!(200000)),
            as_is_value: None,
            rehab_budget: Some(dec!(50000)),
            after_repair_value: Some(dec!(320000)),
            origination_tier: Some(1),
            loan_term_months: Some(12),
        };
        let config = PricingConfig::default();
        let value =
            serde_json::to_value(price_value(&config.fix_flip, Value::Object(args.flags().0)))
                .unwrap();
        assert_eq!(value["total_loan"], "240000");
        assert_eq!(value["final_rate"], "0.0974");
    }

    #[test]
    fn test_bridge_rejection_keeps_envelope_shape() {
        let args = BridgeArgs {
            input: None,
            fico: Some(600),
            experience: None,
            property_value: Some(dec!(500000)),
            loan_amount: Some(dec!(300000)),
            origination_tier: None,
            loan_term_months: None,
        };
        let config = PricingConfig::default();
        let value =
            serde_json::to_value(price_value(&config.bridge, Value::Object(args.flags().0)))
                .unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(
            value["errors"],
            serde_json::json!(["Minimum FICO score is 650 for Bridge loans."])
        );
    }

    #[test]
    fn test_construction_flags_use_snake_case_keys() {
        let args = ConstructionArgs {
            input: None,
            fico: Some(720),
            experience: Some(2),
            land_value: Some(dec!(100000)),
            construction_budget: Some(dec!(300000)),
            completed_value: Some(dec!(600000)),
            origination_tier: Some(2),
            loan_term_months: Some(12),
        };
        let config = PricingConfig::default();
        let value = serde_json::to_value(price_value(
            &config.construction,
            Value::Object(args.flags().0),
        ))
        .unwrap();
        assert_eq!(value["total_loan"], "330000");
    }
}
