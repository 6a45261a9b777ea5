use thiserror::Error;

use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use crate::types::{format_dollars, format_percent, Money, Rate};

/// Every way a scenario or a rate sheet can be rejected.
///
/// `Display` renders the message shown to the borrower, so the wording here
/// is part of the public contract of each engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    #[error("Minimum FICO score is {minimum} for {product} loans.")]
    CreditBelowMinimum { product: &'static str, minimum: u32 },

    #[error("A FICO score is required for {product} loans.")]
    CreditMissing { product: &'static str },

    #[error("{reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Minimum {subject} is ${}.", format_dollars(.minimum))]
    BelowMinimum { subject: &'static str, minimum: Money },

    #[error("Maximum {subject} is ${}.", format_dollars(.maximum))]
    AboveMaximum { subject: &'static str, maximum: Money },

    #[error(
        "Minimum loan amount is ${}. Your estimated loan of ${} is ${} below this threshold.",
        format_dollars(.minimum),
        format_dollars(.estimated),
        shortfall(.minimum, .estimated)
    )]
    LoanBelowMinimum { minimum: Money, estimated: Money },

    #[error(
        "LTV of {} exceeds the maximum {} for your scenario. Max loan: ${}",
        ltv_text(.ltv, .ltv_decimals),
        format_percent(.max_ltv),
        format_dollars(.max_loan)
    )]
    LtvExceeded {
        ltv: Rate,
        /// Fixed decimals for the requested LTV; `None` trims trailing zeros
        ltv_decimals: Option<u32>,
        max_ltv: Rate,
        max_loan: Money,
    },

    #[error("Maximum LTV is {}.", format_percent(.ceiling))]
    LtvAboveProgramCeiling { ceiling: Rate },

    #[error("No {table} bucket covers {value}")]
    TableGap { table: &'static str, value: String },

    #[error("Invalid pricing configuration: {table}: {reason}")]
    InvalidConfig { table: String, reason: String },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn ltv_text(ltv: &Rate, decimals: &Option<u32>) -> String {
    match decimals {
        Some(dp) => {
            let pct = (*ltv * dec!(100))
                .round_dp_with_strategy(*dp, RoundingStrategy::MidpointAwayFromZero);
            format!("{:.*}%", *dp as usize, pct)
        }
        None => format_percent(ltv),
    }
}

fn shortfall(minimum: &Money, estimated: &Money) -> String {
    format_dollars(&(*minimum - *estimated))
}

impl PricingError {
    pub(crate) fn input(field: &str, reason: &str) -> Self {
        PricingError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config(table: &str, reason: impl Into<String>) -> Self {
        PricingError::InvalidConfig {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(e: serde_json::Error) -> Self {
        PricingError::SerializationError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_credit_message() {
        let err = PricingError::CreditBelowMinimum {
            product: "Bridge",
            minimum: 650,
        };
        assert_eq!(err.to_string(), "Minimum FICO score is 650 for Bridge loans.");
    }

    #[test]
    fn test_minimum_value_message_groups_thousands() {
        let err = PricingError::BelowMinimum {
            subject: "property value",
            minimum: dec!(115000),
        };
        assert_eq!(err.to_string(), "Minimum property value is $115,000.");
    }

    #[test]
    fn test_loan_below_minimum_names_shortfall() {
        let err = PricingError::LoanBelowMinimum {
            minimum: dec!(75000),
            estimated: dec!(62500),
        };
        assert_eq!(
            err.to_string(),
            "Minimum loan amount is $75,000. Your estimated loan of $62,500 is $12,500 below this threshold."
        );
    }

    #[test]
    fn test_ltv_exceeded_message() {
        let err = PricingError::LtvExceeded {
            ltv: dec!(0.85),
            ltv_decimals: None,
            max_ltv: dec!(0.80),
            max_loan: dec!(240000),
        };
        assert_eq!(
            err.to_string(),
            "LTV of 85% exceeds the maximum 80% for your scenario. Max loan: $240,000"
        );
    }

    #[test]
    fn test_ltv_exceeded_with_fixed_decimals() {
        let mut err = PricingError::LtvExceeded {
            ltv: dec!(0.85),
            ltv_decimals: Some(1),
            max_ltv: dec!(0.80),
            max_loan: dec!(240000),
        };
        assert!(err.to_string().starts_with("LTV of 85.0% exceeds the maximum 80%"));

        if let PricingError::LtvExceeded { ltv, .. } = &mut err {
            *ltv = dec!(230000) / dec!(300000);
        }
        assert!(err.to_string().starts_with("LTV of 76.7% exceeds"));
    }

    #[test]
    fn test_above_maximum_message() {
        let err = PricingError::AboveMaximum {
            subject: "loan amount",
            maximum: dec!(1000000000),
        };
        assert_eq!(err.to_string(), "Maximum loan amount is $1,000,000,000.");
    }
}
