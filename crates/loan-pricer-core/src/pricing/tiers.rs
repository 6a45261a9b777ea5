use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::pricing::leverage::LeverageAdjustment;
use crate::types::{Money, Rate};
use crate::LoanPricerResult;

// ---------------------------------------------------------------------------
// Threshold scales
// ---------------------------------------------------------------------------

/// One boundary of a bucket scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub threshold: Decimal,
    pub label: String,
}

impl Bucket {
    pub fn new(threshold: Decimal, label: &str) -> Self {
        Bucket {
            threshold,
            label: label.to_string(),
        }
    }
}

/// Ascending floors; a value lands in the highest floor it reaches.
/// Values under the first floor have no bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloorScale {
    pub buckets: Vec<Bucket>,
}

impl FloorScale {
    pub fn index_of(&self, value: Decimal) -> Option<usize> {
        self.buckets.iter().rposition(|b| value >= b.threshold)
    }

    pub fn label(&self, index: usize) -> &str {
        self.buckets.get(index).map_or("", |b| b.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        validate_ascending(table, &self.buckets)
    }
}

/// Ascending ceilings; a value lands in the first ceiling it does not exceed.
/// Values above the last ceiling have no bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CeilingScale {
    pub buckets: Vec<Bucket>,
}

impl CeilingScale {
    pub fn index_of(&self, value: Decimal) -> Option<usize> {
        self.buckets.iter().position(|b| value <= b.threshold)
    }

    pub fn label(&self, index: usize) -> &str {
        self.buckets.get(index).map_or("", |b| b.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        validate_ascending(table, &self.buckets)
    }
}

fn validate_ascending(table: &str, buckets: &[Bucket]) -> LoanPricerResult<()> {
    if buckets.is_empty() {
        return Err(PricingError::config(table, "scale has no buckets"));
    }
    for pair in buckets.windows(2) {
        if pair[1].threshold <= pair[0].threshold {
            return Err(PricingError::config(
                table,
                format!(
                    "thresholds must be strictly ascending ({} then {})",
                    pair[0].threshold, pair[1].threshold
                ),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Loan-size brackets
// ---------------------------------------------------------------------------

/// A bracket covering loan amounts up to and including `ceiling`.
/// `None` is the unbounded catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket<T> {
    #[serde(default)]
    pub ceiling: Option<Money>,
    pub value: T,
}

impl<T> Bracket<T> {
    pub fn upto(ceiling: Money, value: T) -> Self {
        Bracket {
            ceiling: Some(ceiling),
            value,
        }
    }

    pub fn unbounded(value: T) -> Self {
        Bracket {
            ceiling: None,
            value,
        }
    }
}

/// Brackets that partition `[0, inf)`: ascending ceilings ending in a catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketTable<T> {
    pub brackets: Vec<Bracket<T>>,
}

impl<T> BracketTable<T> {
    pub fn new(brackets: Vec<Bracket<T>>) -> Self {
        BracketTable { brackets }
    }

    pub fn lookup(&self, amount: Money) -> Option<&T> {
        self.brackets
            .iter()
            .find(|b| b.ceiling.is_none_or(|c| amount <= c))
            .map(|b| &b.value)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.brackets.iter().map(|b| &b.value)
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        let Some((last, bounded)) = self.brackets.split_last() else {
            return Err(PricingError::config(table, "bracket table is empty"));
        };
        if last.ceiling.is_some() {
            return Err(PricingError::config(
                table,
                "last bracket must be the unbounded catch-all",
            ));
        }

        let mut previous: Option<Money> = None;
        for bracket in bounded {
            let ceiling = bracket.ceiling.ok_or_else(|| {
                PricingError::config(table, "only the last bracket may be unbounded")
            })?;
            if let Some(prev) = previous {
                if ceiling <= prev {
                    return Err(PricingError::config(
                        table,
                        format!("ceilings must be strictly ascending ({prev} then {ceiling})"),
                    ));
                }
            }
            previous = Some(ceiling);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

/// Borrower track record by completed deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceBucket {
    FirstTime,
    Developing,
    Seasoned,
}

impl ExperienceBucket {
    pub fn from_deals(deals: u32) -> Self {
        match deals {
            0 => ExperienceBucket::FirstTime,
            1..=4 => ExperienceBucket::Developing,
            _ => ExperienceBucket::Seasoned,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ExperienceBucket::FirstTime => 0,
            ExperienceBucket::Developing => 1,
            ExperienceBucket::Seasoned => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExperienceBucket::FirstTime => "0 deals",
            ExperienceBucket::Developing => "1-4 deals",
            ExperienceBucket::Seasoned => "5+ deals",
        }
    }
}

/// One value per experience bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceTable<T> {
    pub first_time: T,
    pub developing: T,
    pub seasoned: T,
}

impl<T> ExperienceTable<T> {
    pub fn new(first_time: T, developing: T, seasoned: T) -> Self {
        ExperienceTable {
            first_time,
            developing,
            seasoned,
        }
    }

    pub fn get(&self, bucket: ExperienceBucket) -> &T {
        match bucket {
            ExperienceBucket::FirstTime => &self.first_time,
            ExperienceBucket::Developing => &self.developing,
            ExperienceBucket::Seasoned => &self.seasoned,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExperienceBucket, &T)> {
        [
            (ExperienceBucket::FirstTime, &self.first_time),
            (ExperienceBucket::Developing, &self.developing),
            (ExperienceBucket::Seasoned, &self.seasoned),
        ]
        .into_iter()
    }
}

// ---------------------------------------------------------------------------
// Credit tiers (transitional products)
// ---------------------------------------------------------------------------

/// What to do when a borrower supplies no credit score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFicoPolicy {
    /// Price off the catch-all tier, the most conservative bucket on the sheet.
    #[default]
    WorstCaseBucket,
    /// Refuse to price the scenario.
    Reject,
}

/// Rate and leverage adjustments for scores at or above `min_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTier {
    pub min_score: u32,
    pub label: String,
    pub rate_adjustment: Rate,
    #[serde(default)]
    pub leverage: LeverageAdjustment,
}

/// Credit tiers in descending `min_score` order, ending with a `0` catch-all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTiers {
    pub tiers: Vec<CreditTier>,
    #[serde(default)]
    pub missing_fico: MissingFicoPolicy,
}

impl CreditTiers {
    /// Tier for a score; an absent (or zero) score maps to the catch-all.
    pub fn resolve(&self, fico: Option<u32>) -> Option<&CreditTier> {
        match fico.filter(|score| *score > 0) {
            Some(score) => self.tiers.iter().find(|t| score >= t.min_score),
            None => self.catch_all(),
        }
    }

    pub fn catch_all(&self) -> Option<&CreditTier> {
        self.tiers.last()
    }

    pub fn validate(&self, table: &str) -> LoanPricerResult<()> {
        let Some(last) = self.tiers.last() else {
            return Err(PricingError::config(table, "no credit tiers defined"));
        };
        if last.min_score != 0 {
            return Err(PricingError::config(
                table,
                "last credit tier must be the catch-all (min_score 0)",
            ));
        }
        for pair in self.tiers.windows(2) {
            if pair[1].min_score >= pair[0].min_score {
                return Err(PricingError::config(
                    table,
                    "credit tiers must be listed in strictly descending min_score order",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ltv_scale() -> CeilingScale {
        CeilingScale {
            buckets: [50, 55, 60, 65, 70, 75, 80]
                .iter()
                .map(|c| Bucket::new(Decimal::from(*c), &format!("<= {c}%")))
                .collect(),
        }
    }

    fn fico_scale() -> FloorScale {
        FloorScale {
            buckets: (0..7)
                .map(|i| {
                    let floor = 680 + i * 20;
                    Bucket::new(Decimal::from(floor), &format!("{floor}+"))
                })
                .collect(),
        }
    }

    fn size_brackets() -> BracketTable<Rate> {
        BracketTable::new(vec![
            Bracket::upto(dec!(100000), dec!(0.0035)),
            Bracket::upto(dec!(150000), dec!(0.0025)),
            Bracket::unbounded(dec!(0)),
        ])
    }

    #[test]
    fn test_experience_buckets() {
        assert_eq!(ExperienceBucket::from_deals(0), ExperienceBucket::FirstTime);
        assert_eq!(ExperienceBucket::from_deals(1), ExperienceBucket::Developing);
        assert_eq!(ExperienceBucket::from_deals(4), ExperienceBucket::Developing);
        assert_eq!(ExperienceBucket::from_deals(5), ExperienceBucket::Seasoned);
        assert_eq!(ExperienceBucket::from_deals(40).label(), "5+ deals");
    }

    #[test]
    fn test_ceiling_scale_first_ceiling_not_exceeded() {
        let scale = ltv_scale();
        assert_eq!(scale.index_of(dec!(10)), Some(0));
        assert_eq!(scale.index_of(dec!(50)), Some(0));
        assert_eq!(scale.index_of(dec!(50.01)), Some(1));
        assert_eq!(scale.index_of(dec!(75)), Some(5));
        assert_eq!(scale.index_of(dec!(80)), Some(6));
        assert_eq!(scale.index_of(dec!(80.5)), None);
        assert_eq!(scale.label(5), "<= 75%");
    }

    #[test]
    fn test_floor_scale_highest_floor_reached() {
        let scale = fico_scale();
        assert_eq!(scale.index_of(dec!(679)), None);
        assert_eq!(scale.index_of(dec!(680)), Some(0));
        assert_eq!(scale.index_of(dec!(719)), Some(1));
        assert_eq!(scale.index_of(dec!(850)), Some(6));
        assert_eq!(scale.label(1), "700+");
    }

    #[test]
    fn test_bracket_lookup_inclusive_ceiling() {
        let table = size_brackets();
        assert_eq!(table.lookup(dec!(0)), Some(&dec!(0.0035)));
        assert_eq!(table.lookup(dec!(100000)), Some(&dec!(0.0035)));
        assert_eq!(table.lookup(dec!(100001)), Some(&dec!(0.0025)));
        assert_eq!(table.lookup(dec!(50000000)), Some(&dec!(0)));
        assert!(table.validate("loan_size").is_ok());
    }

    #[test]
    fn test_bracket_validation_requires_catch_all() {
        let table = BracketTable::new(vec![Bracket::upto(dec!(100000), dec!(0.0035))]);
        assert!(table.validate("loan_size").is_err());

        let unordered = BracketTable::new(vec![
            Bracket::upto(dec!(150000), dec!(0.0025)),
            Bracket::upto(dec!(100000), dec!(0.0035)),
            Bracket::unbounded(dec!(0)),
        ]);
        assert!(unordered.validate("loan_size").is_err());
    }

    #[test]
    fn test_scale_validation_rejects_duplicates() {
        let mut scale = ltv_scale();
        scale.buckets[3].threshold = dec!(60);
        assert!(scale.validate("ltv").is_err());
    }

    #[test]
    fn test_credit_tiers_missing_score_uses_catch_all() {
        let tiers = CreditTiers {
            tiers: vec![
                CreditTier {
                    min_score: 700,
                    label: "700+".into(),
                    rate_adjustment: dec!(0),
                    leverage: LeverageAdjustment::default(),
                },
                CreditTier {
                    min_score: 0,
                    label: "No FICO".into(),
                    rate_adjustment: dec!(0.005),
                    leverage: LeverageAdjustment::default(),
                },
            ],
            missing_fico: MissingFicoPolicy::WorstCaseBucket,
        };
        assert!(tiers.validate("credit").is_ok());
        assert_eq!(tiers.resolve(Some(760)).unwrap().min_score, 700);
        assert_eq!(tiers.resolve(Some(0)).unwrap().min_score, 0);
        assert_eq!(tiers.resolve(None).unwrap().label, "No FICO");
    }
}
