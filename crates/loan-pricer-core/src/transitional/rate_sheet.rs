use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::pricing::{
    compose_rate, interest_only_payment, origination_fee, AdjustmentKind, Bracket, BracketTable,
    CreditTier, CreditTiers, ExperienceBucket, ExperienceTable, LeverageAdjustment,
    MissingFicoPolicy, RateAdjustment, RateBuildup, AMOUNT_CEILING_LIMIT,
};
use crate::types::{format_percent, Money, Rate};
use crate::LoanPricerResult;

/// Points charged at closing and the base rates they buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginationTier {
    pub points: Rate,
    pub label: String,
    pub base_rates: ExperienceTable<Rate>,
}

/// Program minimums shared by the short-term products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionalLimits {
    pub min_fico: u32,
    /// Scores under this are priced but draw an advisory
    pub preferred_fico: u32,
    pub min_loan: Money,
    /// Minimum property, after-repair or completed value
    pub min_value: Money,
    /// Largest value, cost or loan amount the program prices
    pub max_amount: Money,
    pub default_term_months: u32,
    pub max_term_months: u32,
}

/// Longest term a transitional sheet may offer.
pub const TERM_MONTHS_LIMIT: u32 = 120;

impl Default for TransitionalLimits {
    fn default() -> Self {
        TransitionalLimits {
            min_fico: 650,
            preferred_fico: 680,
            min_loan: dec!(75000),
            min_value: dec!(100000),
            max_amount: dec!(1000000000),
            default_term_months: 12,
            max_term_months: 36,
        }
    }
}

impl TransitionalLimits {
    /// Requested term, or the default when absent; rejects terms past the maximum.
    pub fn term_months(&self, requested: Option<u32>) -> LoanPricerResult<u32> {
        let months = requested
            .filter(|months| *months > 0)
            .unwrap_or(self.default_term_months);
        if months > self.max_term_months {
            return Err(PricingError::InvalidInput {
                field: "loan_term_months".to_string(),
                reason: format!("Maximum loan term is {} months.", self.max_term_months),
            });
        }
        Ok(months)
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        if self.max_amount < self.min_loan
            || self.max_amount < self.min_value
            || self.max_amount > AMOUNT_CEILING_LIMIT
        {
            return Err(PricingError::config(
                table,
                format!("max_amount must lie between the program minimums and {AMOUNT_CEILING_LIMIT}"),
            ));
        }
        if self.max_term_months == 0 || self.max_term_months > TERM_MONTHS_LIMIT {
            return Err(PricingError::config(
                table,
                format!("max_term_months must lie in 1..={TERM_MONTHS_LIMIT}"),
            ));
        }
        if self.default_term_months == 0 || self.default_term_months > self.max_term_months {
            return Err(PricingError::config(
                table,
                "default_term_months must lie in 1..=max_term_months",
            ));
        }
        Ok(())
    }
}

/// Rate sheet for the residential transitional products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionalRateSheet {
    pub origination_tiers: Vec<OriginationTier>,
    /// Tier used when the requested index is not offered
    pub default_origination_tier: usize,
    pub loan_size: BracketTable<Rate>,
    pub credit: CreditTiers,
}

/// Rate, payment and fee figures common to every transitional quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanCosts {
    pub origination_points: Rate,
    pub origination_tier: String,
    #[serde(flatten)]
    pub rate: RateBuildup,
    pub monthly_interest_only: Money,
    pub origination_fee: Money,
    /// Interest-only carry over the full term
    pub total_interest: Money,
}

impl TransitionalRateSheet {
    /// Tier at `index` (absent means the first tier). An index the sheet does
    /// not offer falls back to the default tier with a warning.
    pub fn origination_tier(
        &self,
        index: Option<u32>,
        warnings: &mut Vec<String>,
    ) -> LoanPricerResult<&OriginationTier> {
        let requested = index.unwrap_or(0) as usize;
        if let Some(tier) = self.origination_tiers.get(requested) {
            return Ok(tier);
        }

        let fallback = self
            .origination_tiers
            .get(self.default_origination_tier)
            .ok_or_else(|| PricingError::TableGap {
                table: "origination_tiers",
                value: self.default_origination_tier.to_string(),
            })?;
        warnings.push(format!(
            "Origination tier {requested} is not offered; priced at {} points.",
            fallback.label
        ));
        Ok(fallback)
    }

    /// Apply the credit gate and resolve the borrower's credit tier.
    ///
    /// Scored borrowers under `min_fico` are rejected. Unscored borrowers are
    /// handled per the sheet's [`MissingFicoPolicy`].
    pub fn resolve_credit(
        &self,
        product: &'static str,
        fico: Option<u32>,
        min_fico: u32,
        warnings: &mut Vec<String>,
    ) -> LoanPricerResult<&CreditTier> {
        let scored = fico.filter(|score| *score > 0);
        match scored {
            Some(score) if score < min_fico => {
                return Err(PricingError::CreditBelowMinimum {
                    product,
                    minimum: min_fico,
                })
            }
            Some(_) => {}
            None => {
                if self.credit.missing_fico == MissingFicoPolicy::Reject {
                    return Err(PricingError::CreditMissing { product });
                }
            }
        }

        let tier = self
            .credit
            .resolve(scored)
            .ok_or_else(|| PricingError::TableGap {
                table: "credit",
                value: scored.map_or_else(|| "none".to_string(), |s| s.to_string()),
            })?;
        tracing::trace!(product, tier = %tier.label, "credit tier resolved");

        if scored.is_none() {
            warnings.push(format!(
                "No FICO score provided; priced at the {} credit tier.",
                tier.label
            ));
        }
        Ok(tier)
    }

    /// Compose the rate for `loan_amount` and derive carry and fees.
    pub fn quote_costs(
        &self,
        loan_amount: Money,
        origination: &OriginationTier,
        experience: ExperienceBucket,
        credit: &CreditTier,
        term_months: u32,
    ) -> LoanPricerResult<LoanCosts> {
        let size_adjustment =
            self.loan_size
                .lookup(loan_amount)
                .copied()
                .ok_or_else(|| PricingError::TableGap {
                    table: "loan_size",
                    value: loan_amount.to_string(),
                })?;

        let rate = compose_rate(
            *origination.base_rates.get(experience),
            vec![
                RateAdjustment::new(AdjustmentKind::Fico, credit.rate_adjustment),
                RateAdjustment::new(AdjustmentKind::LoanSize, size_adjustment),
            ],
        );

        let monthly_interest_only = interest_only_payment(loan_amount, rate.final_rate);
        Ok(LoanCosts {
            origination_points: origination.points,
            origination_tier: origination.label.clone(),
            monthly_interest_only,
            origination_fee: origination_fee(loan_amount, origination.points),
            total_interest: monthly_interest_only * Decimal::from(term_months),
            rate,
        })
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        if self.origination_tiers.is_empty() {
            return Err(PricingError::config(table, "no origination tiers defined"));
        }
        if self.default_origination_tier >= self.origination_tiers.len() {
            return Err(PricingError::config(
                table,
                format!(
                    "default origination tier {} is out of range",
                    self.default_origination_tier
                ),
            ));
        }
        for tier in &self.origination_tiers {
            if tier.points < Decimal::ZERO {
                return Err(PricingError::config(
                    table,
                    format!("origination tier {} has negative points", tier.label),
                ));
            }
            if tier.base_rates.iter().any(|(_, rate)| *rate <= Decimal::ZERO) {
                return Err(PricingError::config(
                    table,
                    format!("origination tier {} has a non-positive base rate", tier.label),
                ));
            }
        }
        self.loan_size.validate(&format!("{table}.loan_size"))?;
        self.credit.validate(&format!("{table}.credit"))?;
        Ok(())
    }
}

impl Default for TransitionalRateSheet {
    fn default() -> Self {
        let tier = |points: Rate, first: Rate, developing: Rate, seasoned: Rate| OriginationTier {
            points,
            label: format_percent(&points),
            base_rates: ExperienceTable::new(first, developing, seasoned),
        };
        let credit = |min_score: u32, label: &str, rate: Rate, t_ltc: Rate| CreditTier {
            min_score,
            label: label.to_string(),
            rate_adjustment: rate,
            leverage: LeverageAdjustment::new(Decimal::ZERO, t_ltc),
        };

        TransitionalRateSheet {
            origination_tiers: vec![
                tier(dec!(0.005), dec!(0.1099), dec!(0.1049), dec!(0.0999)),
                tier(dec!(0.0075), dec!(0.1074), dec!(0.0999), dec!(0.0974)),
                tier(dec!(0.01), dec!(0.1049), dec!(0.0974), dec!(0.0949)),
            ],
            default_origination_tier: 1,
            loan_size: BracketTable::new(vec![
                Bracket::upto(dec!(100000), dec!(0.0035)),
                Bracket::upto(dec!(150000), dec!(0.0025)),
                Bracket::upto(dec!(250000), dec!(0)),
                Bracket::upto(dec!(325000), dec!(-0.001)),
                Bracket::upto(dec!(500000), dec!(-0.0015)),
                Bracket::upto(dec!(625000), dec!(-0.002)),
                Bracket::upto(dec!(750000), dec!(-0.0025)),
                Bracket::upto(dec!(825000), dec!(-0.003)),
                Bracket::unbounded(dec!(-0.003)),
            ]),
            credit: CreditTiers {
                tiers: vec![
                    credit(700, "700+", dec!(0), dec!(0)),
                    credit(680, "680-699", dec!(0.0025), dec!(-0.05)),
                    credit(650, "650-679", dec!(0.005), dec!(-0.10)),
                    credit(0, "No FICO", dec!(0.005), dec!(-0.05)),
                ],
                missing_fico: MissingFicoPolicy::WorstCaseBucket,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_sheet_is_consistent() {
        let sheet = TransitionalRateSheet::default();
        assert!(sheet.validate("transitional").is_ok());
        assert_eq!(sheet.origination_tiers[1].label, "0.75%");
    }

    #[test]
    fn test_limits_term_and_bounds() {
        let limits = TransitionalLimits::default();
        assert_eq!(limits.term_months(None).unwrap(), 12);
        assert_eq!(limits.term_months(Some(0)).unwrap(), 12);
        assert_eq!(limits.term_months(Some(36)).unwrap(), 36);
        assert_eq!(
            limits.term_months(Some(2000)).unwrap_err().to_string(),
            "Maximum loan term is 36 months."
        );

        assert!(limits.validate("bridge.limits").is_ok());
        let mut wide = limits.clone();
        wide.max_amount = dec!(70000000000000000000000000000);
        assert!(wide.validate("bridge.limits").is_err());
        let mut long = limits;
        long.max_term_months = TERM_MONTHS_LIMIT + 1;
        assert!(long.validate("bridge.limits").is_err());
    }

    #[test]
    fn test_origination_tier_fallback_warns() {
        let sheet = TransitionalRateSheet::default();
        let mut warnings = Vec::new();

        assert_eq!(sheet.origination_tier(None, &mut warnings).unwrap().label, "0.5%");
        assert_eq!(sheet.origination_tier(Some(2), &mut warnings).unwrap().label, "1%");
        assert!(warnings.is_empty());

        let tier = sheet.origination_tier(Some(7), &mut warnings).unwrap();
        assert_eq!(tier.points, dec!(0.0075));
        assert_eq!(warnings, vec!["Origination tier 7 is not offered; priced at 0.75% points."]);
    }

    #[test]
    fn test_credit_gate() {
        let sheet = TransitionalRateSheet::default();
        let mut warnings = Vec::new();

        let err = sheet
            .resolve_credit("Bridge", Some(600), 650, &mut warnings)
            .unwrap_err();
        assert_eq!(err.to_string(), "Minimum FICO score is 650 for Bridge loans.");

        let tier = sheet.resolve_credit("Bridge", Some(665), 650, &mut warnings).unwrap();
        assert_eq!(tier.rate_adjustment, dec!(0.005));
        assert_eq!(tier.leverage.t_ltc, dec!(-0.10));
        assert!(warnings.is_empty());

        let tier = sheet.resolve_credit("Bridge", None, 650, &mut warnings).unwrap();
        assert_eq!(tier.label, "No FICO");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_missing_fico_can_be_rejected() {
        let mut sheet = TransitionalRateSheet::default();
        sheet.credit.missing_fico = MissingFicoPolicy::Reject;
        let err = sheet
            .resolve_credit("Fix & Flip", Some(0), 650, &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, PricingError::CreditMissing { product: "Fix & Flip" });
    }

    #[test]
    fn test_quote_costs() {
        let sheet = TransitionalRateSheet::default();
        let costs = sheet
            .quote_costs(
                dec!(240000),
                &sheet.origination_tiers[1],
                ExperienceBucket::Seasoned,
                &sheet.credit.tiers[0],
                12,
            )
            .unwrap();
        assert_eq!(costs.rate.base_rate, dec!(0.0974));
        assert_eq!(costs.rate.final_rate, dec!(0.0974));
        assert_eq!(costs.monthly_interest_only, dec!(1948));
        assert_eq!(costs.origination_fee, dec!(1800));
        assert_eq!(costs.total_interest, dec!(23376));
    }

    #[test]
    fn test_out_of_range_default_tier_rejected() {
        let mut sheet = TransitionalRateSheet::default();
        sheet.default_origination_tier = 3;
        assert!(sheet.validate("transitional").is_err());
    }
}
