use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::engine::PricingEngine;
use crate::error::PricingError;
use crate::pricing::{
    check_amounts, project_profitability, solve_leverage, ExperienceBucket, ExperienceTable,
    LeverageLimits, LeverageRequest, LeverageSizing, Profitability, ProfitabilityInput,
};
use crate::transitional::{LoanCosts, TransitionalLimits, TransitionalRateSheet};
use crate::types::{Money, PricingResult, Rate};
use crate::LoanPricerResult;

const PRODUCT: &str = "New Construction";

/// Ground-up construction. The land is the acquisition and also the as-is
/// value; the construction budget is drawn against the completed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionPricing {
    pub limits: TransitionalLimits,
    pub rates: TransitionalRateSheet,
    pub leverage: ExperienceTable<LeverageLimits>,
    pub funded_share: Rate,
}

impl ConstructionPricing {
    pub fn validate(&self) -> LoanPricerResult<()> {
        self.limits.validate("construction.limits")?;
        self.rates.validate("construction.rates")?;
        for (_, limits) in self.leverage.iter() {
            limits.validate("construction.leverage")?;
        }
        if self.funded_share <= Decimal::ZERO || self.funded_share > Decimal::ONE {
            return Err(PricingError::config(
                "construction.funded_share",
                "funded share must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for ConstructionPricing {
    fn default() -> Self {
        ConstructionPricing {
            limits: TransitionalLimits::default(),
            rates: TransitionalRateSheet::default(),
            leverage: ExperienceTable::new(
                LeverageLimits::new(dec!(0.70), dec!(0.70), dec!(0.65), dec!(0.85)),
                LeverageLimits::new(dec!(0.75), dec!(0.75), dec!(0.70), dec!(0.85)),
                LeverageLimits::new(dec!(0.75), dec!(0.80), dec!(0.75), dec!(0.90)),
            ),
            funded_share: dec!(0.85),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionScenario {
    #[serde(deserialize_with = "coerce::count")]
    pub fico: Option<u32>,
    #[serde(deserialize_with = "coerce::count")]
    pub experience: Option<u32>,
    #[serde(alias = "landValue", deserialize_with = "coerce::money")]
    pub land_value: Money,
    #[serde(alias = "constructionBudget", deserialize_with = "coerce::money")]
    pub construction_budget: Money,
    #[serde(alias = "completedValue", deserialize_with = "coerce::money")]
    pub completed_value: Money,
    #[serde(alias = "origTier", deserialize_with = "coerce::count")]
    pub origination_tier: Option<u32>,
    #[serde(alias = "loanTerm", deserialize_with = "coerce::count")]
    pub loan_term_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionQuote {
    pub fico: Option<u32>,
    pub credit_tier: String,
    pub experience: u32,
    pub experience_label: String,
    pub land_value: Money,
    pub construction_budget: Money,
    pub completed_value: Money,
    pub loan_term_months: u32,
    pub limits: LeverageLimits,
    #[serde(flatten)]
    pub sizing: LeverageSizing,
    #[serde(flatten)]
    pub costs: LoanCosts,
    #[serde(flatten)]
    pub profitability: Profitability,
}

/// Size and price a ground-up construction loan.
pub fn calculate(
    scenario: &ConstructionScenario,
    pricing: &ConstructionPricing,
) -> PricingResult<ConstructionQuote> {
    let mut warnings: Vec<String> = Vec::new();
    let outcome = price(scenario, pricing, &mut warnings);
    if let Ok(quote) = &outcome {
        tracing::debug!(
            product = PRODUCT,
            final_rate = %quote.costs.rate.final_rate,
            total_loan = %quote.sizing.total_loan,
            "scenario priced"
        );
    }
    PricingResult::from_outcome(PRODUCT, outcome, warnings)
}

impl PricingEngine for ConstructionPricing {
    type Scenario = ConstructionScenario;
    type Quote = ConstructionQuote;

    const PRODUCT: &'static str = PRODUCT;

    fn price(&self, scenario: &ConstructionScenario) -> PricingResult<ConstructionQuote> {
        calculate(scenario, self)
    }
}

fn price(
    scenario: &ConstructionScenario,
    pricing: &ConstructionPricing,
    warnings: &mut Vec<String>,
) -> LoanPricerResult<ConstructionQuote> {
    let limits = &pricing.limits;
    let land = scenario.land_value;
    let budget = scenario.construction_budget;
    let completed = scenario.completed_value;

    let credit = pricing
        .rates
        .resolve_credit(PRODUCT, scenario.fico, limits.min_fico, warnings)?;
    check_amounts(
        &[
            ("land value", scenario.land_value),
            ("construction budget", scenario.construction_budget),
            ("completed value", scenario.completed_value),
        ],
        limits.max_amount,
    )?;

    if land <= Decimal::ZERO {
        return Err(PricingError::input(
            "land_value",
            "Please enter a valid land/lot value.",
        ));
    }
    if budget <= Decimal::ZERO {
        return Err(PricingError::input(
            "construction_budget",
            "Please enter a valid construction budget.",
        ));
    }
    if completed <= Decimal::ZERO {
        return Err(PricingError::input(
            "completed_value",
            "Please enter a valid completed/after-built value.",
        ));
    }
    if completed < limits.min_value {
        return Err(PricingError::BelowMinimum {
            subject: "completed value",
            minimum: limits.min_value,
        });
    }
    if completed <= land + budget {
        return Err(PricingError::input(
            "completed_value",
            "Completed value should exceed total project cost (land + construction).",
        ));
    }

    let deals = scenario.experience.unwrap_or(0);
    let experience = ExperienceBucket::from_deals(deals);
    let leverage_limits = *pricing.leverage.get(experience);

    let sizing = solve_leverage(&LeverageRequest {
        acquisition_cost: land,
        as_is_value: land,
        improvement_budget: budget,
        completed_value: completed,
        limits: leverage_limits,
        credit_adjustment: credit.leverage,
        funded_share: pricing.funded_share,
        minimum_loan: limits.min_loan,
    })?;

    let origination = pricing.rates.origination_tier(scenario.origination_tier, warnings)?;
    let term_months = limits.term_months(scenario.loan_term_months)?;
    let costs = pricing.rates.quote_costs(
        sizing.total_loan,
        origination,
        experience,
        credit,
        term_months,
    )?;

    let profitability = project_profitability(&ProfitabilityInput {
        exit_value: completed,
        acquisition_cost: land,
        improvement_budget: budget,
        origination_fee: costs.origination_fee,
        total_interest: costs.total_interest,
        down_payment: sizing.down_payment,
        improvement_out_of_pocket: sizing.improvement_out_of_pocket,
    });

    if experience == ExperienceBucket::FirstTime {
        warnings.push(
            "First-time builders should expect to provide entitlements, permits, approved plans and a feasibility study."
                .to_string(),
        );
    }
    if let Some(score) = scenario.fico.filter(|s| *s > 0 && *s < limits.preferred_fico) {
        warnings.push(format!(
            "FICO of {score} is below {} and reduces leverage (T-LTC reduced 5-10%).",
            limits.preferred_fico
        ));
    }

    Ok(ConstructionQuote {
        fico: scenario.fico.filter(|s| *s > 0),
        credit_tier: credit.label.clone(),
        experience: deals,
        experience_label: experience.label().to_string(),
        land_value: land,
        construction_budget: budget,
        completed_value: completed,
        loan_term_months: term_months,
        limits: leverage_limits,
        sizing,
        costs,
        profitability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scenario() -> ConstructionScenario {
        ConstructionScenario {
            fico: Some(720),
            experience: Some(2),
            land_value: dec!(100000),
            construction_budget: dec!(300000),
            completed_value: dec!(600000),
            origination_tier: Some(2),
            loan_term_months: Some(12),
        }
    }

    #[test]
    fn test_developing_builder_quote() {
        let result = calculate(&scenario(), &ConstructionPricing::default());
        assert!(result.warnings().is_empty());
        let q = result.into_quote().unwrap();

        assert_eq!(q.sizing.max_by_ai_ltv, dec!(75000));
        assert_eq!(q.sizing.max_by_i_ltc, dec!(300000));
        assert_eq!(q.sizing.max_by_ar_ltv, dec!(420000));
        assert_eq!(q.sizing.max_by_t_ltc, dec!(340000));
        assert_eq!(q.sizing.initial_advance, dec!(75000));
        assert_eq!(q.sizing.improvement_funded, dec!(255000));
        assert_eq!(q.sizing.total_loan, dec!(330000));
        assert_eq!(q.sizing.improvement_out_of_pocket, dec!(45000));
        assert_eq!(q.sizing.down_payment, dec!(25000));

        assert_eq!(q.costs.rate.base_rate, dec!(0.0974));
        assert_eq!(q.costs.rate.final_rate, dec!(0.0959));
        assert_eq!(q.costs.monthly_interest_only, dec!(2637.25));
        assert_eq!(q.costs.origination_fee, dec!(3300));
        assert_eq!(q.profitability.projected_profit, dec!(165053));
        assert_eq!(q.profitability.total_investor_cost, dec!(104947));
    }

    #[test]
    fn test_no_equity_cushion_always_rejected() {
        for completed in [dec!(400000), dec!(350000)] {
            for fico in [Some(800), None] {
                let s = ConstructionScenario {
                    completed_value: completed,
                    fico,
                    ..scenario()
                };
                let result = calculate(&s, &ConstructionPricing::default());
                assert_eq!(
                    result.errors(),
                    ["Completed value should exceed total project cost (land + construction)."]
                );
            }
        }
    }

    #[test]
    fn test_first_time_builder_note() {
        let s = ConstructionScenario {
            experience: Some(0),
            ..scenario()
        };
        let result = calculate(&s, &ConstructionPricing::default());
        assert!(result.is_valid());
        assert_eq!(result.warnings().len(), 1);
        assert!(result.warnings()[0].starts_with("First-time builders"));
    }

    #[test]
    fn test_input_messages() {
        let mut s = scenario();
        s.fico = Some(620);
        assert_eq!(
            calculate(&s, &ConstructionPricing::default()).errors(),
            ["Minimum FICO score is 650 for New Construction loans."]
        );
        s.fico = Some(720);
        s.land_value = Decimal::ZERO;
        assert_eq!(
            calculate(&s, &ConstructionPricing::default()).errors(),
            ["Please enter a valid land/lot value."]
        );
        s.land_value = dec!(20000);
        s.construction_budget = dec!(40000);
        s.completed_value = dec!(90000);
        assert_eq!(
            calculate(&s, &ConstructionPricing::default()).errors(),
            ["Minimum completed value is $100,000."]
        );
    }
}
