use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::engine::PricingEngine;
use crate::error::PricingError;
use crate::pricing::{check_amounts, ExperienceBucket, ExperienceTable};
use crate::transitional::{LoanCosts, TransitionalLimits, TransitionalRateSheet};
use crate::types::{Money, PricingResult, Rate};
use crate::LoanPricerResult;

const PRODUCT: &str = "Bridge";

/// Bridge loans size against a single LTV cap; there is no budget to fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgePricing {
    pub limits: TransitionalLimits,
    pub rates: TransitionalRateSheet,
    pub max_ltv: ExperienceTable<Rate>,
}

impl BridgePricing {
    pub fn validate(&self) -> LoanPricerResult<()> {
        self.limits.validate("bridge.limits")?;
        self.rates.validate("bridge.rates")?;
        if self
            .max_ltv
            .iter()
            .any(|(_, ltv)| *ltv <= Decimal::ZERO || *ltv > Decimal::ONE)
        {
            return Err(PricingError::config(
                "bridge.max_ltv",
                "maximum LTV must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for BridgePricing {
    fn default() -> Self {
        BridgePricing {
            limits: TransitionalLimits::default(),
            rates: TransitionalRateSheet::default(),
            max_ltv: ExperienceTable::new(dec!(0.75), dec!(0.75), dec!(0.80)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeScenario {
    #[serde(deserialize_with = "coerce::count")]
    pub fico: Option<u32>,
    #[serde(deserialize_with = "coerce::count")]
    pub experience: Option<u32>,
    #[serde(alias = "propertyValue", deserialize_with = "coerce::money")]
    pub property_value: Money,
    #[serde(alias = "loanAmount", deserialize_with = "coerce::money")]
    pub loan_amount: Money,
    #[serde(alias = "origTier", deserialize_with = "coerce::count")]
    pub origination_tier: Option<u32>,
    #[serde(alias = "loanTerm", deserialize_with = "coerce::count")]
    pub loan_term_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeQuote {
    pub fico: Option<u32>,
    pub credit_tier: String,
    pub experience: u32,
    pub experience_label: String,
    pub property_value: Money,
    pub loan_amount: Money,
    pub loan_term_months: u32,
    pub ltv: Rate,
    /// Experience cap plus the credit tier's AR-LTV adjustment
    pub max_ltv: Rate,
    pub max_loan: Money,
    pub down_payment: Money,
    #[serde(flatten)]
    pub costs: LoanCosts,
}

/// Price a bridge loan.
pub fn calculate(scenario: &BridgeScenario, pricing: &BridgePricing) -> PricingResult<BridgeQuote> {
    let mut warnings: Vec<String> = Vec::new();
    let outcome = price(scenario, pricing, &mut warnings);
    if let Ok(quote) = &outcome {
        tracing::debug!(
            product = PRODUCT,
            final_rate = %quote.costs.rate.final_rate,
            loan_amount = %quote.loan_amount,
            "scenario priced"
        );
    }
    PricingResult::from_outcome(PRODUCT, outcome, warnings)
}

impl PricingEngine for BridgePricing {
    type Scenario = BridgeScenario;
    type Quote = BridgeQuote;

    const PRODUCT: &'static str = PRODUCT;

    fn price(&self, scenario: &BridgeScenario) -> PricingResult<BridgeQuote> {
        calculate(scenario, self)
    }
}

fn price(
    scenario: &BridgeScenario,
    pricing: &BridgePricing,
    warnings: &mut Vec<String>,
) -> LoanPricerResult<BridgeQuote> {
    let limits = &pricing.limits;
    let value = scenario.property_value;
    let loan = scenario.loan_amount;

    let credit = pricing
        .rates
        .resolve_credit(PRODUCT, scenario.fico, limits.min_fico, warnings)?;
    check_amounts(
        &[
            ("property value", scenario.property_value),
            ("loan amount", scenario.loan_amount),
        ],
        limits.max_amount,
    )?;

    if value <= Decimal::ZERO {
        return Err(PricingError::input(
            "property_value",
            "Please enter a valid property value.",
        ));
    }
    if value < limits.min_value {
        return Err(PricingError::BelowMinimum {
            subject: "property value",
            minimum: limits.min_value,
        });
    }
    if loan <= Decimal::ZERO {
        return Err(PricingError::input(
            "loan_amount",
            "Please enter a valid loan amount.",
        ));
    }
    if loan < limits.min_loan {
        return Err(PricingError::BelowMinimum {
            subject: "loan amount",
            minimum: limits.min_loan,
        });
    }

    let deals = scenario.experience.unwrap_or(0);
    let experience = ExperienceBucket::from_deals(deals);
    let max_ltv = *pricing.max_ltv.get(experience) + credit.leverage.ar_ltv;
    let max_loan = (value * max_ltv).floor();
    let ltv = loan / value;
    if ltv > max_ltv {
        return Err(PricingError::LtvExceeded {
            ltv,
            ltv_decimals: None,
            max_ltv,
            max_loan,
        });
    }

    let origination = pricing.rates.origination_tier(scenario.origination_tier, warnings)?;
    let term_months = limits.term_months(scenario.loan_term_months)?;
    let costs = pricing
        .rates
        .quote_costs(loan, origination, experience, credit, term_months)?;

    if let Some(score) = scenario.fico.filter(|s| *s > 0 && *s < limits.preferred_fico) {
        warnings.push(format!(
            "FICO of {score} is below {} and carries a rate adjustment of +0.25% to +0.50%.",
            limits.preferred_fico
        ));
    }

    Ok(BridgeQuote {
        fico: scenario.fico.filter(|s| *s > 0),
        credit_tier: credit.label.clone(),
        experience: deals,
        experience_label: experience.label().to_string(),
        property_value: value,
        loan_amount: loan,
        loan_term_months: term_months,
        ltv,
        max_ltv,
        max_loan,
        down_payment: (value - loan).max(Decimal::ZERO),
        costs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::AdjustmentKind;
    use pretty_assertions::assert_eq;

    fn scenario() -> BridgeScenario {
        BridgeScenario {
            fico: Some(720),
            experience: Some(6),
            property_value: dec!(400000),
            loan_amount: dec!(300000),
            origination_tier: Some(0),
            loan_term_months: Some(12),
        }
    }

    fn rejection(scenario: &BridgeScenario) -> String {
        let result = calculate(scenario, &BridgePricing::default());
        assert!(!result.is_valid());
        result.errors()[0].clone()
    }

    #[test]
    fn test_seasoned_bridge_quote() {
        let q = calculate(&scenario(), &BridgePricing::default())
            .into_quote()
            .unwrap();
        assert_eq!(q.ltv, dec!(0.75));
        assert_eq!(q.max_ltv, dec!(0.80));
        assert_eq!(q.max_loan, dec!(320000));
        assert_eq!(q.down_payment, dec!(100000));
        assert_eq!(q.costs.rate.base_rate, dec!(0.0999));
        assert_eq!(q.costs.rate.adjustment(AdjustmentKind::LoanSize), dec!(-0.001));
        assert_eq!(q.costs.rate.final_rate, dec!(0.0989));
        assert_eq!(q.costs.origination_fee, dec!(1500));
        assert_eq!(q.costs.monthly_interest_only, dec!(2472.5));
        assert_eq!(q.costs.total_interest, dec!(29670));
    }

    #[test]
    fn test_low_fico_always_rejected() {
        for loan in [dec!(0), dec!(80000), dec!(1000000)] {
            let s = BridgeScenario {
                fico: Some(600),
                loan_amount: loan,
                ..scenario()
            };
            assert!(rejection(&s).contains("Minimum FICO score is 650"));
        }
    }

    #[test]
    fn test_value_and_loan_checks() {
        let mut s = scenario();
        s.property_value = Decimal::ZERO;
        assert_eq!(rejection(&s), "Please enter a valid property value.");
        s.property_value = dec!(95000);
        assert_eq!(rejection(&s), "Minimum property value is $100,000.");
        s.property_value = dec!(400000);
        s.loan_amount = Decimal::ZERO;
        assert_eq!(rejection(&s), "Please enter a valid loan amount.");
        s.loan_amount = dec!(60000);
        assert_eq!(rejection(&s), "Minimum loan amount is $75,000.");
    }

    #[test]
    fn test_ltv_cap_by_experience() {
        let s = BridgeScenario {
            experience: Some(2),
            loan_amount: dec!(310000),
            ..scenario()
        };
        assert_eq!(
            rejection(&s),
            "LTV of 77.5% exceeds the maximum 75% for your scenario. Max loan: $300,000"
        );
    }

    #[test]
    fn test_sub_preferred_fico_is_priced_with_note() {
        let s = BridgeScenario {
            fico: Some(690),
            ..scenario()
        };
        let result = calculate(&s, &BridgePricing::default());
        let q = result.quote().unwrap();
        assert_eq!(q.costs.rate.adjustment(AdjustmentKind::Fico), dec!(0.0025));
        assert_eq!(result.warnings().len(), 1);
    }
}
