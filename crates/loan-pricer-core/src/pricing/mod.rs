//! Building blocks shared by every product engine.

pub mod adjustments;
pub mod leverage;
pub mod payments;
pub mod tiers;

pub use adjustments::{compose_rate, AdjustmentKind, RateAdjustment, RateBuildup, RateMatrix};
pub use leverage::{solve_leverage, LeverageAdjustment, LeverageLimits, LeverageRequest, LeverageSizing};
pub use payments::{
    amortizing_payment, debt_service_coverage, interest_only_payment, origination_fee,
    project_profitability, Profitability, ProfitabilityInput,
};
pub use tiers::{
    Bracket, BracketTable, Bucket, CeilingScale, CreditTier, CreditTiers, ExperienceBucket,
    ExperienceTable, FloorScale, MissingFicoPolicy,
};

use rust_decimal_macros::dec;

use crate::error::PricingError;
use crate::types::Money;
use crate::LoanPricerResult;

/// Largest amount a rate sheet may allow for any single input.
pub const AMOUNT_CEILING_LIMIT: Money = dec!(1000000000000000);

/// Reject any scenario amount whose magnitude exceeds `maximum`. Engines
/// call this before touching scenario amounts arithmetically.
pub(crate) fn check_amounts(amounts: &[(&'static str, Money)], maximum: Money) -> LoanPricerResult<()> {
    for &(subject, amount) in amounts {
        if amount.abs() > maximum {
            tracing::trace!(subject, %amount, %maximum, "amount above program maximum");
            return Err(PricingError::AboveMaximum { subject, maximum });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_ceiling_limit_is_one_quadrillion() {
        assert_eq!(AMOUNT_CEILING_LIMIT, dec!(1000000000000000));
    }

    #[test]
    fn test_check_amounts_reports_first_offender() {
        let maximum = dec!(1000000000);
        assert!(check_amounts(&[("loan amount", dec!(250000))], maximum).is_ok());
        assert!(check_amounts(&[("loan amount", maximum)], maximum).is_ok());

        let err = check_amounts(
            &[
                ("property value", dec!(300000)),
                ("loan amount", dec!(-70000000000000000000000000000)),
                ("monthly rent", dec!(70000000000000000000000000000)),
            ],
            maximum,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PricingError::AboveMaximum {
                subject: "loan amount",
                maximum,
            }
        );
    }
}
