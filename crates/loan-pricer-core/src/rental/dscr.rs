use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::engine::PricingEngine;
use crate::error::PricingError;
use crate::pricing::{
    amortizing_payment, check_amounts, compose_rate, debt_service_coverage,
    interest_only_payment, AdjustmentKind, RateAdjustment, RateBuildup,
};
use crate::rental::{DscrPricing, IoPeriod, LoanPurpose, PrepayPenalty, PropertyType};
use crate::types::{Money, PricingResult};
use crate::LoanPricerResult;

const PRODUCT: &str = "DSCR";

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Rental scenario as submitted by the loan sizer form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DscrScenario {
    #[serde(deserialize_with = "coerce::count")]
    pub fico: Option<u32>,
    #[serde(alias = "propertyValue", deserialize_with = "coerce::money")]
    pub property_value: Money,
    #[serde(alias = "loanAmount", deserialize_with = "coerce::money")]
    pub loan_amount: Money,
    #[serde(alias = "propertyType", deserialize_with = "coerce::choice")]
    pub property_type: Option<PropertyType>,
    #[serde(deserialize_with = "coerce::choice")]
    pub purpose: Option<LoanPurpose>,
    #[serde(alias = "ioOption", deserialize_with = "coerce::choice")]
    pub io_option: Option<IoPeriod>,
    #[serde(
        alias = "pppOption",
        alias = "prepayOption",
        deserialize_with = "coerce::choice"
    )]
    pub prepay_option: Option<PrepayPenalty>,
    #[serde(alias = "monthlyRent", deserialize_with = "coerce::money")]
    pub monthly_rent: Money,
    #[serde(alias = "annualTaxes", deserialize_with = "coerce::money")]
    pub annual_taxes: Money,
    #[serde(alias = "annualInsurance", deserialize_with = "coerce::money")]
    pub annual_insurance: Money,
    #[serde(alias = "annualHOA", alias = "annualHoa", deserialize_with = "coerce::money")]
    pub annual_hoa: Money,
    #[serde(alias = "termYears", deserialize_with = "coerce::count")]
    pub term_years: Option<u32>,
}

/// Which payment the coverage ratio is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentBasis {
    PrincipalAndInterest,
    InterestOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DscrQuote {
    pub fico: u32,
    pub fico_bucket: String,
    pub property_value: Money,
    pub loan_amount: Money,
    pub property_type: PropertyType,
    pub purpose: LoanPurpose,
    pub io_option: IoPeriod,
    pub prepay_option: PrepayPenalty,
    /// Loan-to-value in percent
    pub ltv: Decimal,
    pub ltv_bucket: String,
    /// Scenario LTV ceiling in percent
    pub max_ltv: Decimal,
    #[serde(flatten)]
    pub rate: RateBuildup,
    pub term_years: u32,
    pub term_months: u32,
    pub monthly_principal_interest: Money,
    pub monthly_interest_only: Money,
    /// Taxes, insurance and HOA dues per month
    pub monthly_escrow: Money,
    pub qualifying_payment: PaymentBasis,
    pub monthly_pitia: Money,
    /// `None` when no rent was supplied
    pub dscr: Option<Decimal>,
    pub min_dscr: Decimal,
    pub dscr_pass: Option<bool>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price a rental loan against a DSCR rate sheet.
pub fn calculate(scenario: &DscrScenario, pricing: &DscrPricing) -> PricingResult<DscrQuote> {
    let mut warnings: Vec<String> = Vec::new();
    let outcome = price(scenario, pricing, &mut warnings);
    if let Ok(quote) = &outcome {
        tracing::debug!(
            product = PRODUCT,
            final_rate = %quote.rate.final_rate,
            loan_amount = %quote.loan_amount,
            "scenario priced"
        );
    }
    PricingResult::from_outcome(PRODUCT, outcome, warnings)
}

impl PricingEngine for DscrPricing {
    type Scenario = DscrScenario;
    type Quote = DscrQuote;

    const PRODUCT: &'static str = PRODUCT;

    fn price(&self, scenario: &DscrScenario) -> PricingResult<DscrQuote> {
        calculate(scenario, self)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

fn price(
    scenario: &DscrScenario,
    pricing: &DscrPricing,
    warnings: &mut Vec<String>,
) -> LoanPricerResult<DscrQuote> {
    let limits = &pricing.limits;
    let property_type = scenario.property_type.unwrap_or_default();
    let purpose = scenario.purpose.unwrap_or_default();
    let io_option = scenario.io_option.unwrap_or_default();
    let prepay_option = scenario.prepay_option.unwrap_or_default();

    // -- Validation -----------------------------------------------------------
    let fico = match scenario.fico {
        Some(score) if score >= limits.min_fico => score,
        _ => {
            return Err(PricingError::CreditBelowMinimum {
                product: PRODUCT,
                minimum: limits.min_fico,
            })
        }
    };
    check_amounts(
        &[
            ("property value", scenario.property_value),
            ("loan amount", scenario.loan_amount),
            ("monthly rent", scenario.monthly_rent),
            ("annual taxes", scenario.annual_taxes),
            ("annual insurance", scenario.annual_insurance),
            ("annual HOA", scenario.annual_hoa),
        ],
        limits.max_amount,
    )?;
    let term_years = scenario
        .term_years
        .filter(|years| *years > 0)
        .unwrap_or(limits.default_term_years);
    if term_years > limits.max_term_years {
        return Err(PricingError::InvalidInput {
            field: "term_years".to_string(),
            reason: format!("Maximum term is {} years.", limits.max_term_years),
        });
    }
    if scenario.property_value < limits.min_property_value {
        return Err(PricingError::BelowMinimum {
            subject: "property value",
            minimum: limits.min_property_value,
        });
    }
    if scenario.loan_amount < limits.min_loan {
        return Err(PricingError::BelowMinimum {
            subject: "loan amount",
            minimum: limits.min_loan,
        });
    }

    let fico_idx = pricing
        .fico_buckets
        .index_of(Decimal::from(fico))
        .ok_or_else(|| PricingError::TableGap {
            table: "dscr.fico_buckets",
            value: fico.to_string(),
        })?;

    let ltv = scenario.loan_amount / scenario.property_value * dec!(100);
    let max_ltv = lookup(&pricing.max_ltv.get(purpose)[..], fico_idx, "dscr.max_ltv")?;

    if ltv > max_ltv {
        return Err(PricingError::LtvExceeded {
            ltv: ltv / dec!(100),
            ltv_decimals: Some(1),
            max_ltv: max_ltv / dec!(100),
            max_loan: (scenario.property_value * max_ltv / dec!(100)).floor(),
        });
    }
    if ltv > limits.max_ltv {
        return Err(PricingError::LtvAboveProgramCeiling {
            ceiling: limits.max_ltv / dec!(100),
        });
    }

    // -- Bucket lookups -------------------------------------------------------
    let ltv_idx = pricing
        .ltv_buckets
        .index_of(ltv)
        .ok_or_else(|| PricingError::TableGap {
            table: "dscr.ltv_buckets",
            value: ltv.to_string(),
        })?;
    tracing::trace!(fico_idx, ltv_idx, %ltv, "dscr buckets resolved");

    let base_rate = pricing
        .base_rates
        .get(fico_idx, ltv_idx)
        .ok_or_else(|| PricingError::TableGap {
            table: "dscr.base_rates",
            value: format!("({fico_idx}, {ltv_idx})"),
        })?;

    // -- Rate composition -----------------------------------------------------
    let size_row = pricing
        .loan_size
        .lookup(scenario.loan_amount)
        .ok_or_else(|| PricingError::TableGap {
            table: "dscr.loan_size",
            value: scenario.loan_amount.to_string(),
        })?;

    let rate = compose_rate(
        base_rate,
        vec![
            RateAdjustment::new(
                AdjustmentKind::PropertyType,
                lookup(pricing.property_type.row(property_type), ltv_idx, "dscr.property_type")?,
            ),
            RateAdjustment::new(
                AdjustmentKind::Purpose,
                lookup(pricing.purpose.get(purpose), ltv_idx, "dscr.purpose")?,
            ),
            RateAdjustment::new(
                AdjustmentKind::InterestOnly,
                lookup(pricing.interest_only.row(io_option), ltv_idx, "dscr.interest_only")?,
            ),
            RateAdjustment::new(
                AdjustmentKind::Prepayment,
                pricing.prepayment.get(prepay_option),
            ),
            RateAdjustment::new(
                AdjustmentKind::LoanSize,
                lookup(size_row, ltv_idx, "dscr.loan_size")?,
            ),
        ],
    );

    // -- Payments and coverage ------------------------------------------------
    let term_months = term_years.saturating_mul(12);

    let monthly_principal_interest =
        amortizing_payment(scenario.loan_amount, rate.final_rate, term_months)?;
    let monthly_interest_only = interest_only_payment(scenario.loan_amount, rate.final_rate);
    let monthly_escrow =
        (scenario.annual_taxes + scenario.annual_insurance + scenario.annual_hoa) / dec!(12);

    let (qualifying_payment, qualifying_amount) = if io_option.is_interest_only() {
        (PaymentBasis::InterestOnly, monthly_interest_only)
    } else {
        (PaymentBasis::PrincipalAndInterest, monthly_principal_interest)
    };
    let monthly_pitia = qualifying_amount + monthly_escrow;

    let dscr = debt_service_coverage(scenario.monthly_rent, monthly_pitia);
    let min_dscr = lookup(&pricing.min_dscr, fico_idx, "dscr.min_dscr")?;
    let dscr_pass = dscr.map(|ratio| ratio >= min_dscr);

    if let Some(ratio) = dscr.filter(|ratio| *ratio < min_dscr) {
        warnings.push(format!(
            "DSCR of {}x is below the {}x minimum for a {} credit score.",
            ratio.round_dp(2),
            min_dscr.round_dp(2),
            pricing.fico_buckets.label(fico_idx)
        ));
    }

    Ok(DscrQuote {
        fico,
        fico_bucket: pricing.fico_buckets.label(fico_idx).to_string(),
        property_value: scenario.property_value,
        loan_amount: scenario.loan_amount,
        property_type,
        purpose,
        io_option,
        prepay_option,
        ltv,
        ltv_bucket: pricing.ltv_buckets.label(ltv_idx).to_string(),
        max_ltv,
        rate,
        term_years,
        term_months,
        monthly_principal_interest,
        monthly_interest_only,
        monthly_escrow,
        qualifying_payment,
        monthly_pitia,
        dscr,
        min_dscr,
        dscr_pass,
    })
}

fn lookup(row: &[Decimal], index: usize, table: &'static str) -> LoanPricerResult<Decimal> {
    row.get(index).copied().ok_or_else(|| PricingError::TableGap {
        table,
        value: format!("column {index}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn purchase_at_75() -> DscrScenario {
        DscrScenario {
            fico: Some(700),
            property_value: dec!(300000),
            loan_amount: dec!(225000),
            purpose: Some(LoanPurpose::Purchase),
            ..Default::default()
        }
    }

    fn quote(scenario: &DscrScenario) -> DscrQuote {
        calculate(scenario, &DscrPricing::default())
            .into_quote()
            .expect("scenario should price")
    }

    fn rejection(scenario: &DscrScenario) -> String {
        let result = calculate(scenario, &DscrPricing::default());
        assert!(!result.is_valid());
        result.errors()[0].clone()
    }

    #[test]
    fn test_purchase_at_75_ltv() {
        let q = quote(&purchase_at_75());

        assert_eq!(q.ltv, dec!(75));
        assert_eq!(q.ltv_bucket, "<= 75%");
        assert_eq!(q.fico_bucket, "700+");
        assert_eq!(q.max_ltv, dec!(80));
        assert_eq!(q.rate.base_rate, dec!(0.06875));
        // Default prepay is the 5y flat credit
        assert_eq!(q.rate.adjustment(AdjustmentKind::Prepayment), dec!(-0.0025));
        assert_eq!(q.rate.final_rate, dec!(0.06625));
        assert_eq!(q.term_months, 360);
        assert_eq!(q.qualifying_payment, PaymentBasis::PrincipalAndInterest);
        assert_eq!(q.dscr, None);
        assert_eq!(q.dscr_pass, None);
    }

    #[test]
    fn test_final_rate_is_base_plus_itemized() {
        let scenario = DscrScenario {
            fico: Some(745),
            property_value: dec!(140000),
            loan_amount: dec!(95000),
            property_type: Some(PropertyType::SfrAdu),
            purpose: Some(LoanPurpose::CashOutRefi),
            io_option: Some(IoPeriod::FiveYear),
            prepay_option: Some(PrepayPenalty::ThreeYearStepDown),
            ..Default::default()
        };
        let q = quote(&scenario);
        // 95,000 / 140,000 is about 67.86%, the 70% column
        assert_eq!(q.ltv_bucket, "<= 70%");
        assert_eq!(q.rate.base_rate, dec!(0.06425));
        assert_eq!(q.rate.adjustment(AdjustmentKind::PropertyType), dec!(0.0015));
        assert_eq!(q.rate.adjustment(AdjustmentKind::Purpose), dec!(0.00175));
        assert_eq!(q.rate.adjustment(AdjustmentKind::InterestOnly), dec!(0.00225));
        assert_eq!(q.rate.adjustment(AdjustmentKind::Prepayment), dec!(0.001));
        assert_eq!(q.rate.adjustment(AdjustmentKind::LoanSize), dec!(0.00125));
        let itemized: Decimal = q.rate.adjustments.iter().map(|a| a.amount).sum();
        assert_eq!(q.rate.final_rate, q.rate.base_rate + itemized);
        assert_eq!(q.rate.final_rate, dec!(0.072));
        assert_eq!(q.qualifying_payment, PaymentBasis::InterestOnly);
    }

    #[test]
    fn test_coverage_uses_escrow_and_flags_shortfall() {
        let scenario = DscrScenario {
            monthly_rent: dec!(1500),
            annual_taxes: dec!(3600),
            annual_insurance: dec!(1200),
            io_option: Some(IoPeriod::TenYear),
            ..purchase_at_75()
        };
        let result = calculate(&scenario, &DscrPricing::default());
        let q = result.quote().unwrap();

        assert_eq!(q.monthly_escrow, dec!(400));
        assert_eq!(q.monthly_pitia, q.monthly_interest_only + dec!(400));
        let dscr = q.dscr.unwrap();
        assert!(dscr < dec!(1.10));
        assert_eq!(q.min_dscr, dec!(1.10));
        assert_eq!(q.dscr_pass, Some(false));
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn test_validation_order() {
        let mut scenario = purchase_at_75();
        scenario.fico = Some(679);
        scenario.property_value = dec!(50000);
        assert_eq!(rejection(&scenario), "Minimum FICO score is 680 for DSCR loans.");

        scenario.fico = None;
        assert_eq!(rejection(&scenario), "Minimum FICO score is 680 for DSCR loans.");

        scenario.fico = Some(700);
        assert_eq!(rejection(&scenario), "Minimum property value is $115,000.");

        scenario.property_value = dec!(300000);
        scenario.loan_amount = dec!(70000);
        assert_eq!(rejection(&scenario), "Minimum loan amount is $75,000.");
    }

    #[test]
    fn test_amounts_past_program_maximum_rejected() {
        let huge = dec!(70000000000000000000000000000);
        let scenario = DscrScenario {
            property_value: huge,
            loan_amount: huge,
            ..purchase_at_75()
        };
        assert_eq!(rejection(&scenario), "Maximum property value is $1,000,000,000.");

        let scenario = DscrScenario {
            annual_taxes: huge,
            annual_insurance: huge,
            ..purchase_at_75()
        };
        assert_eq!(rejection(&scenario), "Maximum annual taxes is $1,000,000,000.");
    }

    #[test]
    fn test_term_past_program_maximum_rejected() {
        let scenario = DscrScenario {
            term_years: Some(2000),
            ..purchase_at_75()
        };
        assert_eq!(rejection(&scenario), "Maximum term is 40 years.");

        let scenario = DscrScenario {
            term_years: Some(u32::MAX),
            ..purchase_at_75()
        };
        assert_eq!(rejection(&scenario), "Maximum term is 40 years.");

        let q = quote(&DscrScenario {
            term_years: Some(40),
            ..purchase_at_75()
        });
        assert_eq!(q.term_months, 480);
    }

    #[test]
    fn test_ltv_above_scenario_maximum() {
        let scenario = DscrScenario {
            loan_amount: dec!(255000),
            ..purchase_at_75()
        };
        assert_eq!(
            rejection(&scenario),
            "LTV of 85.0% exceeds the maximum 80% for your scenario. Max loan: $240,000"
        );
    }

    #[test]
    fn test_cash_out_ceiling_is_lower() {
        let scenario = DscrScenario {
            purpose: Some(LoanPurpose::CashOutRefi),
            ..purchase_at_75()
        };
        let q = quote(&scenario);
        assert_eq!(q.max_ltv, dec!(75));

        let over = DscrScenario {
            loan_amount: dec!(230000),
            ..scenario
        };
        assert!(rejection(&over).starts_with("LTV of 76.7% exceeds the maximum 75%"));
    }

    #[test]
    fn test_program_ceiling_applies_after_scenario_maximum() {
        let mut sheet = DscrPricing::default();
        sheet.max_ltv.purchase = vec![dec!(85); 7];
        let scenario = DscrScenario {
            loan_amount: dec!(250000),
            ..purchase_at_75()
        };
        let result = calculate(&scenario, &sheet);
        assert_eq!(result.errors(), ["Maximum LTV is 80%."]);
    }

    #[test]
    fn test_lenient_form_input() {
        let scenario: DscrScenario = serde_json::from_str(
            r#"{
                "fico": "700",
                "propertyValue": "$300,000",
                "loanAmount": 225000,
                "propertyType": "Detached SFR",
                "purpose": "Purchase",
                "ioOption": "",
                "termYears": 0
            }"#,
        )
        .unwrap();
        let q = quote(&scenario);
        assert_eq!(q.io_option, IoPeriod::None);
        assert_eq!(q.term_years, 30);
        assert_eq!(q.rate.final_rate, dec!(0.06625));
    }

    #[test]
    fn test_engine_rejects_unknown_selector() {
        let result = crate::price_json(
            &DscrPricing::default(),
            r#"{"fico": 720, "propertyValue": 300000, "loanAmount": 200000, "propertyType": "Castle"}"#,
        );
        assert!(!result.is_valid());
        assert!(result.errors()[0].starts_with("Invalid scenario: unknown selection 'Castle'"));
    }
}
