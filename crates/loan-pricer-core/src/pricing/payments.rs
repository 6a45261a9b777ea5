use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::types::{Money, Rate};
use crate::LoanPricerResult;

/// Monthly interest on the full note: `principal * rate / 12`.
pub fn interest_only_payment(principal: Money, annual_rate: Rate) -> Money {
    principal * annual_rate / dec!(12)
}

/// Level monthly payment that retires `principal` over `term_months`.
pub fn amortizing_payment(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> LoanPricerResult<Money> {
    if term_months == 0 {
        return Err(PricingError::input(
            "term_months",
            "Loan term must be at least one month.",
        ));
    }

    let monthly_rate = annual_rate / dec!(12);
    if monthly_rate.is_zero() {
        // Interest-free: straight-line amortisation
        return Ok(principal / Decimal::from(term_months));
    }

    // (1 + r)^n via iterative multiplication
    let growth = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..term_months {
        compound = compound.checked_mul(growth).ok_or_else(|| {
            PricingError::input("term_months", "Loan term is too long to amortize at this rate.")
        })?;
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(PricingError::input(
            "annual_rate",
            "Rate is too small to amortize over this term.",
        ));
    }

    principal
        .checked_mul(monthly_rate)
        .and_then(|interest| interest.checked_mul(compound))
        .and_then(|scaled| scaled.checked_div(denominator))
        .ok_or_else(|| PricingError::input("principal", "Loan amount is too large to amortize."))
}

/// Fee charged at closing: `loan * points`.
pub fn origination_fee(loan_amount: Money, points: Rate) -> Money {
    loan_amount * points
}

/// Debt-service coverage: rent over the all-in monthly payment.
/// `None` when no rent is supplied or there is nothing to cover.
pub fn debt_service_coverage(monthly_rent: Money, monthly_obligation: Money) -> Option<Decimal> {
    if monthly_rent <= Decimal::ZERO || monthly_obligation <= Decimal::ZERO {
        return None;
    }
    Some(monthly_rent / monthly_obligation)
}

/// Inputs to a hold-and-exit projection.
#[derive(Debug, Clone)]
pub struct ProfitabilityInput {
    pub exit_value: Money,
    pub acquisition_cost: Money,
    pub improvement_budget: Money,
    pub origination_fee: Money,
    pub total_interest: Money,
    pub down_payment: Money,
    pub improvement_out_of_pocket: Money,
}

/// Projected investor economics over the hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    pub projected_profit: Money,
    /// Cash the investor puts in: down payment, unfunded budget, fee and carry
    pub total_investor_cost: Money,
    /// Profit over investor cost; zero when the investor puts in nothing
    pub projected_roi: Decimal,
}

pub fn project_profitability(input: &ProfitabilityInput) -> Profitability {
    let projected_profit = input.exit_value
        - input.acquisition_cost
        - input.improvement_budget
        - input.origination_fee
        - input.total_interest;

    let total_investor_cost = input.down_payment
        + input.improvement_out_of_pocket
        + input.origination_fee
        + input.total_interest;

    let projected_roi = if total_investor_cost > Decimal::ZERO {
        projected_profit / total_investor_cost
    } else {
        Decimal::ZERO
    };

    Profitability {
        projected_profit,
        total_investor_cost,
        projected_roi,
    }
}
