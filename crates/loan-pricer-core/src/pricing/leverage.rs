use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::pricing::{check_amounts, AMOUNT_CEILING_LIMIT};
use crate::types::{Money, Rate};
use crate::LoanPricerResult;

/// Leverage ceilings, each a fraction of a value or cost base.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageLimits {
    /// As-is loan-to-value: initial advance / as-is value
    pub ai_ltv: Rate,
    /// Initial loan-to-cost: initial advance / total project cost
    pub i_ltc: Rate,
    /// After-repair loan-to-value: total loan / completed value
    pub ar_ltv: Rate,
    /// Total loan-to-cost: total loan / total project cost
    pub t_ltc: Rate,
}

impl LeverageLimits {
    pub fn new(ai_ltv: Rate, i_ltc: Rate, ar_ltv: Rate, t_ltc: Rate) -> Self {
        LeverageLimits {
            ai_ltv,
            i_ltc,
            ar_ltv,
            t_ltc,
        }
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        let all = [self.ai_ltv, self.i_ltc, self.ar_ltv, self.t_ltc];
        if all.iter().any(|l| *l <= Decimal::ZERO || *l > Decimal::ONE) {
            return Err(PricingError::config(
                table,
                "leverage limits must lie in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// Credit-driven shifts applied to the total-loan ceilings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LeverageAdjustment {
    #[serde(default)]
    pub ar_ltv: Rate,
    #[serde(default)]
    pub t_ltc: Rate,
}

impl LeverageAdjustment {
    pub fn new(ar_ltv: Rate, t_ltc: Rate) -> Self {
        LeverageAdjustment { ar_ltv, t_ltc }
    }
}

/// A rehab or ground-up project to size.
#[derive(Debug, Clone)]
pub struct LeverageRequest {
    /// Purchase price or land cost
    pub acquisition_cost: Money,
    pub as_is_value: Money,
    /// Rehab or construction budget
    pub improvement_budget: Money,
    /// After-repair or completed value
    pub completed_value: Money,
    pub limits: LeverageLimits,
    pub credit_adjustment: LeverageAdjustment,
    /// Share of the budget the lender advances; the rest is held back
    pub funded_share: Rate,
    pub minimum_loan: Money,
}

/// Result of sizing a project against all four ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageSizing {
    pub total_cost: Money,
    pub max_by_ai_ltv: Money,
    pub max_by_i_ltc: Money,
    pub max_by_ar_ltv: Money,
    pub max_by_t_ltc: Money,
    /// AR-LTV limit after the credit adjustment
    pub adjusted_ar_ltv: Rate,
    /// T-LTC limit after the credit adjustment
    pub adjusted_t_ltc: Rate,
    pub initial_advance: Money,
    pub improvement_funded: Money,
    pub improvement_out_of_pocket: Money,
    pub total_loan: Money,
    pub down_payment: Money,
    pub actual_ai_ltv: Rate,
    pub actual_i_ltc: Rate,
    pub actual_ar_ltv: Rate,
    pub actual_t_ltc: Rate,
    /// True when the total loan had to be pulled back under a ceiling
    pub clamped_to_ceiling: bool,
}

/// Size the initial advance and total loan for a project.
///
/// The initial advance is capped by AI-LTV, I-LTC and the acquisition cost
/// itself; the total loan by AR-LTV and T-LTC. At most `funded_share` of the
/// budget is advanced. If the advance alone breaches a total-loan ceiling the
/// loan is pulled back, taking funded budget first and then the advance.
pub fn solve_leverage(req: &LeverageRequest) -> LoanPricerResult<LeverageSizing> {
    validate_request(req)?;

    let total_cost = req.acquisition_cost + req.improvement_budget;
    let adjusted_ar_ltv = req.limits.ar_ltv + req.credit_adjustment.ar_ltv;
    let adjusted_t_ltc = req.limits.t_ltc + req.credit_adjustment.t_ltc;

    let max_by_ai_ltv = (req.as_is_value * req.limits.ai_ltv).floor();
    let max_by_i_ltc = (total_cost * req.limits.i_ltc).floor();
    let max_by_ar_ltv = (req.completed_value * adjusted_ar_ltv).floor();
    let max_by_t_ltc = (total_cost * adjusted_t_ltc).floor();

    let mut initial_advance = max_by_ai_ltv.min(max_by_i_ltc).min(req.acquisition_cost);
    let max_total_loan = max_by_ar_ltv.min(max_by_t_ltc);

    let funding_room = (max_total_loan - initial_advance)
        .max(Decimal::ZERO)
        .min(req.improvement_budget);
    let holdback_target = (req.improvement_budget * req.funded_share).floor();
    let mut improvement_funded = holdback_target.min(funding_room);
    let mut total_loan = initial_advance + improvement_funded;

    if total_loan < req.minimum_loan {
        return Err(PricingError::LoanBelowMinimum {
            minimum: req.minimum_loan,
            estimated: total_loan,
        });
    }

    let clamped_to_ceiling = total_loan > max_total_loan;
    if clamped_to_ceiling {
        tracing::trace!(%total_loan, %max_total_loan, "total loan clamped to ceiling");
        total_loan = max_total_loan;
        let remaining = total_loan - initial_advance;
        if remaining < Decimal::ZERO {
            initial_advance = total_loan;
            improvement_funded = Decimal::ZERO;
        } else {
            improvement_funded = remaining;
        }
    }

    let improvement_out_of_pocket = req.improvement_budget - improvement_funded;
    let down_payment = (req.acquisition_cost - initial_advance).max(Decimal::ZERO);

    Ok(LeverageSizing {
        total_cost,
        max_by_ai_ltv,
        max_by_i_ltc,
        max_by_ar_ltv,
        max_by_t_ltc,
        adjusted_ar_ltv,
        adjusted_t_ltc,
        initial_advance,
        improvement_funded,
        improvement_out_of_pocket,
        total_loan,
        down_payment,
        actual_ai_ltv: initial_advance / req.as_is_value,
        actual_i_ltc: initial_advance / total_cost,
        actual_ar_ltv: total_loan / req.completed_value,
        actual_t_ltc: total_loan / total_cost,
        clamped_to_ceiling,
    })
}

fn validate_request(req: &LeverageRequest) -> LoanPricerResult<()> {
    check_amounts(
        &[
            ("acquisition cost", req.acquisition_cost),
            ("as-is value", req.as_is_value),
            ("improvement budget", req.improvement_budget),
            ("completed value", req.completed_value),
            ("minimum loan", req.minimum_loan),
        ],
        AMOUNT_CEILING_LIMIT,
    )?;
    if req.acquisition_cost <= Decimal::ZERO {
        return Err(PricingError::input(
            "acquisition_cost",
            "Acquisition cost must be positive.",
        ));
    }
    if req.as_is_value <= Decimal::ZERO {
        return Err(PricingError::input(
            "as_is_value",
            "As-is value must be positive.",
        ));
    }
    if req.improvement_budget <= Decimal::ZERO {
        return Err(PricingError::input(
            "improvement_budget",
            "Improvement budget must be positive.",
        ));
    }
    if req.completed_value <= req.acquisition_cost + req.improvement_budget {
        return Err(PricingError::input(
            "completed_value",
            "Completed value must exceed the total project cost.",
        ));
    }
    Ok(())
}
