use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};

use crate::error::PricingError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.0974 = 9.74%). Never as percentages.
pub type Rate = Decimal;

/// Metadata attached to every priced scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub precision: String,
}

impl ComputationMetadata {
    pub fn current() -> Self {
        ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            precision: "rust_decimal_128bit".to_string(),
        }
    }
}

/// Outcome of one engine invocation.
///
/// A rejected scenario carries exactly one human-readable error. Warnings are
/// advisory only and never change validity.
#[derive(Debug, Clone, PartialEq)]
pub enum PricingResult<Q> {
    Valid { quote: Q, warnings: Vec<String> },
    Invalid {
        errors: Vec<String>,
        warnings: Vec<String>,
    },
}

impl<Q> PricingResult<Q> {
    /// Fold an engine's internal `Result` into the public envelope.
    pub fn from_outcome(
        product: &'static str,
        outcome: Result<Q, PricingError>,
        warnings: Vec<String>,
    ) -> Self {
        match outcome {
            Ok(quote) => PricingResult::Valid { quote, warnings },
            Err(err) => Self::rejected(product, err, warnings),
        }
    }

    pub fn rejected(product: &'static str, err: PricingError, warnings: Vec<String>) -> Self {
        tracing::debug!(product, reason = %err, "scenario rejected");
        PricingResult::Invalid {
            errors: vec![err.to_string()],
            warnings,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, PricingResult::Valid { .. })
    }

    pub fn quote(&self) -> Option<&Q> {
        match self {
            PricingResult::Valid { quote, .. } => Some(quote),
            PricingResult::Invalid { .. } => None,
        }
    }

    pub fn into_quote(self) -> Option<Q> {
        match self {
            PricingResult::Valid { quote, .. } => Some(quote),
            PricingResult::Invalid { .. } => None,
        }
    }

    pub fn errors(&self) -> &[String] {
        match self {
            PricingResult::Valid { .. } => &[],
            PricingResult::Invalid { errors, .. } => errors,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            PricingResult::Valid { warnings, .. } | PricingResult::Invalid { warnings, .. } => {
                warnings
            }
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a, Q> {
    valid: bool,
    errors: &'a [String],
    warnings: &'a [String],
    #[serde(flatten)]
    quote: Option<&'a Q>,
    metadata: ComputationMetadata,
}

impl<Q: Serialize> Serialize for PricingResult<Q> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Envelope {
            valid: self.is_valid(),
            errors: self.errors(),
            warnings: self.warnings(),
            quote: self.quote(),
            metadata: ComputationMetadata::current(),
        }
        .serialize(serializer)
    }
}

/// Whole dollars with thousands separators, e.g. `75000.4` -> `75,000`.
pub fn format_dollars(value: &Money) -> String {
    let rounded = value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Ratio rendered as a percentage with at most two decimals, e.g. `0.725` -> `72.5%`.
pub fn format_percent(ratio: &Rate) -> String {
    let pct = (*ratio * dec!(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    format!("{pct}%")
}
