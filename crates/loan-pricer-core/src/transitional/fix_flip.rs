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
use crate::types::{format_percent, Money, PricingResult, Rate};
use crate::LoanPricerResult;

const PRODUCT: &str = "Fix & Flip";

// ---------------------------------------------------------------------------
// Rehab severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RehabSeverity {
    Light,
    Moderate,
    Heavy,
}

/// Rehab budget as a share of purchase price, bucketed by inclusive ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityScale {
    pub light_max: Rate,
    pub moderate_max: Rate,
}

impl SeverityScale {
    pub fn classify(&self, rehab_share: Rate) -> RehabSeverity {
        if rehab_share <= self.light_max {
            RehabSeverity::Light
        } else if rehab_share <= self.moderate_max {
            RehabSeverity::Moderate
        } else {
            RehabSeverity::Heavy
        }
    }
}

/// Leverage limits by rehab severity and borrower experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehabTable {
    pub light: ExperienceTable<LeverageLimits>,
    pub moderate: ExperienceTable<LeverageLimits>,
    pub heavy: ExperienceTable<LeverageLimits>,
}

impl RehabTable {
    pub fn limits(&self, severity: RehabSeverity, experience: ExperienceBucket) -> LeverageLimits {
        let table = match severity {
            RehabSeverity::Light => &self.light,
            RehabSeverity::Moderate => &self.moderate,
            RehabSeverity::Heavy => &self.heavy,
        };
        *table.get(experience)
    }

    fn validate(&self) -> LoanPricerResult<()> {
        for table in [&self.light, &self.moderate, &self.heavy] {
            for (_, limits) in table.iter() {
                limits.validate("fix_flip.leverage")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pricing configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixFlipPricing {
    pub limits: TransitionalLimits,
    pub rates: TransitionalRateSheet,
    pub severity: SeverityScale,
    pub leverage: RehabTable,
    /// Share of the rehab budget advanced; the remainder is held back
    pub funded_share: Rate,
}

impl FixFlipPricing {
    pub fn validate(&self) -> LoanPricerResult<()> {
        self.limits.validate("fix_flip.limits")?;
        self.rates.validate("fix_flip.rates")?;
        self.leverage.validate()?;
        if self.severity.light_max >= self.severity.moderate_max {
            return Err(PricingError::config(
                "fix_flip.severity",
                "light_max must be below moderate_max",
            ));
        }
        if self.funded_share <= Decimal::ZERO || self.funded_share > Decimal::ONE {
            return Err(PricingError::config(
                "fix_flip.funded_share",
                "funded share must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for FixFlipPricing {
    fn default() -> Self {
        let l = |ai, i, ar, t| LeverageLimits::new(ai, i, ar, t);
        FixFlipPricing {
            limits: TransitionalLimits::default(),
            rates: TransitionalRateSheet::default(),
            severity: SeverityScale {
                light_max: dec!(0.25),
                moderate_max: dec!(0.50),
            },
            leverage: RehabTable {
                light: ExperienceTable::new(
                    l(dec!(1.00), dec!(0.85), dec!(0.70), dec!(0.90)),
                    l(dec!(1.00), dec!(0.90), dec!(0.75), dec!(0.95)),
                    l(dec!(1.00), dec!(0.95), dec!(0.75), dec!(1.00)),
                ),
                moderate: ExperienceTable::new(
                    l(dec!(1.00), dec!(0.85), dec!(0.70), dec!(0.90)),
                    l(dec!(1.00), dec!(0.90), dec!(0.725), dec!(0.925)),
                    l(dec!(1.00), dec!(0.925), dec!(0.75), dec!(0.95)),
                ),
                heavy: ExperienceTable::new(
                    l(dec!(0.70), dec!(0.70), dec!(0.60), dec!(0.80)),
                    l(dec!(0.80), dec!(0.80), dec!(0.65), dec!(0.875)),
                    l(dec!(0.85), dec!(0.85), dec!(0.70), dec!(0.90)),
                ),
            },
            funded_share: dec!(0.85),
        }
    }
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixFlipScenario {
    #[serde(deserialize_with = "coerce::count")]
    pub fico: Option<u32>,
    /// Completed deals
    #[serde(deserialize_with = "coerce::count")]
    pub experience: Option<u32>,
    #[serde(alias = "purchasePrice", deserialize_with = "coerce::money")]
    pub purchase_price: Money,
    /// Defaults to the purchase price when not supplied
    #[serde(alias = "asIsValue", deserialize_with = "coerce::money")]
    pub as_is_value: Money,
    #[serde(alias = "rehabBudget", deserialize_with = "coerce::money")]
    pub rehab_budget: Money,
    #[serde(alias = "afterRepairValue", alias = "arv", deserialize_with = "coerce::money")]
    pub after_repair_value: Money,
    #[serde(alias = "origTier", deserialize_with = "coerce::count")]
    pub origination_tier: Option<u32>,
    #[serde(alias = "loanTerm", deserialize_with = "coerce::count")]
    pub loan_term_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixFlipQuote {
    pub fico: Option<u32>,
    pub credit_tier: String,
    pub experience: u32,
    pub experience_label: String,
    pub purchase_price: Money,
    pub as_is_value: Money,
    pub rehab_budget: Money,
    pub after_repair_value: Money,
    pub rehab_type: RehabSeverity,
    /// Rehab budget over purchase price
    pub rehab_percentage: Rate,
    pub loan_term_months: u32,
    pub limits: LeverageLimits,
    #[serde(flatten)]
    pub sizing: LeverageSizing,
    #[serde(flatten)]
    pub costs: LoanCosts,
    #[serde(flatten)]
    pub profitability: Profitability,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Size and price a fix-and-flip loan.
pub fn calculate(scenario: &FixFlipScenario, pricing: &FixFlipPricing) -> PricingResult<FixFlipQuote> {
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

impl PricingEngine for FixFlipPricing {
    type Scenario = FixFlipScenario;
    type Quote = FixFlipQuote;

    const PRODUCT: &'static str = PRODUCT;

    fn price(&self, scenario: &FixFlipScenario) -> PricingResult<FixFlipQuote> {
        calculate(scenario, self)
    }
}

fn price(
    scenario: &FixFlipScenario,
    pricing: &FixFlipPricing,
    warnings: &mut Vec<String>,
) -> LoanPricerResult<FixFlipQuote> {
    let limits = &pricing.limits;
    let purchase = scenario.purchase_price;
    let rehab = scenario.rehab_budget;
    let arv = scenario.after_repair_value;

    // -- Validation -----------------------------------------------------------
    let credit = pricing
        .rates
        .resolve_credit(PRODUCT, scenario.fico, limits.min_fico, warnings)?;
    check_amounts(
        &[
            ("purchase price", scenario.purchase_price),
            ("as-is value", scenario.as_is_value),
            ("rehab budget", scenario.rehab_budget),
            ("After-Repair Value", scenario.after_repair_value),
        ],
        limits.max_amount,
    )?;

    if purchase <= Decimal::ZERO {
        return Err(PricingError::input(
            "purchase_price",
            "Please enter a valid purchase price.",
        ));
    }
    if arv <= Decimal::ZERO {
        return Err(PricingError::input(
            "after_repair_value",
            "Please enter a valid After-Repair Value (ARV).",
        ));
    }
    if arv < limits.min_value {
        return Err(PricingError::BelowMinimum {
            subject: "After-Repair Value",
            minimum: limits.min_value,
        });
    }
    if arv <= purchase {
        return Err(PricingError::input(
            "after_repair_value",
            "After-Repair Value must be greater than the purchase price.",
        ));
    }
    if rehab <= Decimal::ZERO {
        return Err(PricingError::input("rehab_budget", "Please enter a rehab budget."));
    }
    if arv <= purchase + rehab {
        return Err(PricingError::input(
            "after_repair_value",
            "After-Repair Value must exceed the total project cost (purchase + rehab).",
        ));
    }

    // -- Leverage -------------------------------------------------------------
    let as_is_value = if scenario.as_is_value > Decimal::ZERO {
        scenario.as_is_value
    } else {
        purchase
    };
    let deals = scenario.experience.unwrap_or(0);
    let experience = ExperienceBucket::from_deals(deals);
    let rehab_percentage = rehab / purchase;
    let rehab_type = pricing.severity.classify(rehab_percentage);
    let leverage_limits = pricing.leverage.limits(rehab_type, experience);
    tracing::trace!(?rehab_type, ?experience, "fix & flip buckets resolved");

    let sizing = solve_leverage(&LeverageRequest {
        acquisition_cost: purchase,
        as_is_value,
        improvement_budget: rehab,
        completed_value: arv,
        limits: leverage_limits,
        credit_adjustment: credit.leverage,
        funded_share: pricing.funded_share,
        minimum_loan: limits.min_loan,
    })?;

    // -- Pricing and returns --------------------------------------------------
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
        exit_value: arv,
        acquisition_cost: purchase,
        improvement_budget: rehab,
        origination_fee: costs.origination_fee,
        total_interest: costs.total_interest,
        down_payment: sizing.down_payment,
        improvement_out_of_pocket: sizing.improvement_out_of_pocket,
    });

    // -- Advisories -----------------------------------------------------------
    if rehab_type == RehabSeverity::Heavy && experience != ExperienceBucket::Seasoned {
        warnings.push(format!(
            "Heavy rehab projects (over {} of purchase price) have tighter leverage limits for borrowers with fewer than 5 deals.",
            format_percent(&pricing.severity.moderate_max)
        ));
    }
    if let Some(score) = scenario.fico.filter(|s| *s > 0 && *s < limits.preferred_fico) {
        warnings.push(format!(
            "FICO of {score} is below {} and reduces leverage (T-LTC reduced 5-10%).",
            limits.preferred_fico
        ));
    }

    Ok(FixFlipQuote {
        fico: scenario.fico.filter(|s| *s > 0),
        credit_tier: credit.label.clone(),
        experience: deals,
        experience_label: experience.label().to_string(),
        purchase_price: purchase,
        as_is_value,
        rehab_budget: rehab,
        after_repair_value: arv,
        rehab_type,
        rehab_percentage,
        loan_term_months: term_months,
        limits: leverage_limits,
        sizing,
        costs,
        profitability,
    })
}
