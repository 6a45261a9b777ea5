use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::types::Rate;
use crate::LoanPricerResult;

/// Source of an additive rate adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Fico,
    LoanSize,
    PropertyType,
    Purpose,
    InterestOnly,
    Prepayment,
}

impl AdjustmentKind {
    pub fn label(self) -> &'static str {
        match self {
            AdjustmentKind::Fico => "FICO",
            AdjustmentKind::LoanSize => "Loan Size",
            AdjustmentKind::PropertyType => "Property Type",
            AdjustmentKind::Purpose => "Loan Purpose",
            AdjustmentKind::InterestOnly => "Interest-Only",
            AdjustmentKind::Prepayment => "Prepay Penalty",
        }
    }
}

/// One labelled line of a rate build-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateAdjustment {
    pub kind: AdjustmentKind,
    pub amount: Rate,
}

impl RateAdjustment {
    pub fn new(kind: AdjustmentKind, amount: Rate) -> Self {
        RateAdjustment { kind, amount }
    }
}

/// Base rate plus itemized adjustments, as quoted to the borrower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBuildup {
    pub base_rate: Rate,
    pub adjustments: Vec<RateAdjustment>,
    pub total_adjustment: Rate,
    pub final_rate: Rate,
}

impl RateBuildup {
    /// Sum of the adjustments of one kind; zero when the kind is absent.
    pub fn adjustment(&self, kind: AdjustmentKind) -> Rate {
        self.adjustments
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.amount)
            .sum()
    }
}

/// Sum independent adjustments onto a base rate.
///
/// No floor is applied: the result can go negative if a rate sheet allows it.
pub fn compose_rate(base_rate: Rate, adjustments: Vec<RateAdjustment>) -> RateBuildup {
    let total_adjustment: Rate = adjustments.iter().map(|a| a.amount).sum();
    let final_rate = base_rate + total_adjustment;

    tracing::trace!(%base_rate, %total_adjustment, %final_rate, "rate composed");

    RateBuildup {
        base_rate,
        adjustments,
        total_adjustment,
        final_rate,
    }
}

/// Dense matrix of base rates addressed by (row bucket, column bucket).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateMatrix {
    pub rows: Vec<Vec<Rate>>,
}

impl RateMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<Rate> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn validate(&self, table: &str, rows: usize, cols: usize) -> LoanPricerResult<()> {
        if self.rows.len() != rows {
            return Err(PricingError::config(
                table,
                format!("expected {rows} rows, found {}", self.rows.len()),
            ));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != cols {
                return Err(PricingError::config(
                    table,
                    format!("row {i} has {} columns, expected {cols}", row.len()),
                ));
            }
            if row.iter().any(|r| *r <= Decimal::ZERO) {
                return Err(PricingError::config(
                    table,
                    format!("row {i} contains a non-positive base rate"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compose_rate_sums_adjustments() {
        let buildup = compose_rate(
            dec!(0.06875),
            vec![
                RateAdjustment::new(AdjustmentKind::PropertyType, dec!(0.00275)),
                RateAdjustment::new(AdjustmentKind::Prepayment, dec!(-0.0025)),
                RateAdjustment::new(AdjustmentKind::LoanSize, dec!(0)),
            ],
        );
        assert_eq!(buildup.total_adjustment, dec!(0.00025));
        assert_eq!(buildup.final_rate, dec!(0.069));
        assert_eq!(buildup.adjustment(AdjustmentKind::Prepayment), dec!(-0.0025));
        assert_eq!(buildup.adjustment(AdjustmentKind::Fico), dec!(0));
    }

    #[test]
    fn test_compose_rate_has_no_floor() {
        let buildup = compose_rate(
            dec!(0.001),
            vec![RateAdjustment::new(AdjustmentKind::Prepayment, dec!(-0.0025))],
        );
        assert_eq!(buildup.final_rate, dec!(-0.0015));
    }

    #[test]
    fn test_rate_matrix_shape_validation() {
        let matrix = RateMatrix {
            rows: vec![vec![dec!(0.06), dec!(0.065)], vec![dec!(0.059)]],
        };
        assert_eq!(matrix.get(0, 1), Some(dec!(0.065)));
        assert_eq!(matrix.get(1, 1), None);
        assert!(matrix.validate("base_rates", 2, 2).is_err());
    }
}
