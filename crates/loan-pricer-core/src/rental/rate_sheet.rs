use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::pricing::{
    Bracket, BracketTable, Bucket, CeilingScale, FloorScale, RateMatrix, AMOUNT_CEILING_LIMIT,
};
use crate::rental::{IoPeriod, LoanPurpose, PrepayPenalty, PropertyType};
use crate::types::{Money, Rate};
use crate::LoanPricerResult;

/// One adjustment per LTV bucket.
pub type LtvRow = Vec<Rate>;

// ---------------------------------------------------------------------------
// Categorical adjustment tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTypeAdjustments {
    pub detached_sfr: LtvRow,
    pub townhome: LtvRow,
    pub pud: LtvRow,
    pub sfr_adu: LtvRow,
    pub two_to_four_unit: LtvRow,
    pub condo_warrantable: LtvRow,
    pub condo_non_warrantable: LtvRow,
    pub five_to_nine_unit: LtvRow,
    pub ten_plus_unit: LtvRow,
}

impl PropertyTypeAdjustments {
    pub fn row(&self, property_type: PropertyType) -> &[Rate] {
        match property_type {
            PropertyType::DetachedSfr => &self.detached_sfr,
            PropertyType::Townhome => &self.townhome,
            PropertyType::Pud => &self.pud,
            PropertyType::SfrAdu => &self.sfr_adu,
            PropertyType::TwoToFourUnit => &self.two_to_four_unit,
            PropertyType::CondoWarrantable => &self.condo_warrantable,
            PropertyType::CondoNonWarrantable => &self.condo_non_warrantable,
            PropertyType::FiveToNineUnit => &self.five_to_nine_unit,
            PropertyType::TenPlusUnit => &self.ten_plus_unit,
        }
    }
}

/// One value per loan purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurposeTable<T> {
    pub purchase: T,
    pub delayed_purchase: T,
    pub rate_term_refi: T,
    pub cash_out_refi: T,
}

impl<T> PurposeTable<T> {
    pub fn get(&self, purpose: LoanPurpose) -> &T {
        match purpose {
            LoanPurpose::Purchase => &self.purchase,
            LoanPurpose::DelayedPurchase => &self.delayed_purchase,
            LoanPurpose::RateTermRefi => &self.rate_term_refi,
            LoanPurpose::CashOutRefi => &self.cash_out_refi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IoAdjustments {
    pub no_io: LtvRow,
    pub five_year: LtvRow,
    pub seven_year: LtvRow,
    pub ten_year: LtvRow,
}

impl IoAdjustments {
    pub fn row(&self, period: IoPeriod) -> &[Rate] {
        match period {
            IoPeriod::None => &self.no_io,
            IoPeriod::FiveYear => &self.five_year,
            IoPeriod::SevenYear => &self.seven_year,
            IoPeriod::TenYear => &self.ten_year,
        }
    }
}

/// Prepayment adjustments are flat across LTV buckets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepayAdjustments {
    pub five_year_flat: Rate,
    pub five_year_step_down: Rate,
    pub three_year_step_down: Rate,
    pub two_year_step_down: Rate,
    pub one_year: Rate,
    pub no_prepay: Rate,
}

impl PrepayAdjustments {
    pub fn get(&self, penalty: PrepayPenalty) -> Rate {
        match penalty {
            PrepayPenalty::FiveYearFlat => self.five_year_flat,
            PrepayPenalty::FiveYearStepDown => self.five_year_step_down,
            PrepayPenalty::ThreeYearStepDown => self.three_year_step_down,
            PrepayPenalty::TwoYearStepDown => self.two_year_step_down,
            PrepayPenalty::OneYear => self.one_year,
            PrepayPenalty::None => self.no_prepay,
        }
    }
}

// ---------------------------------------------------------------------------
// Program
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DscrProgramLimits {
    pub min_fico: u32,
    pub min_property_value: Money,
    pub min_loan: Money,
    /// Program-wide LTV ceiling, in percent
    pub max_ltv: Decimal,
    /// Largest value, loan, rent or escrow amount the program prices
    pub max_amount: Money,
    pub default_term_years: u32,
    pub max_term_years: u32,
}

/// Longest amortization a sheet may offer.
pub const TERM_YEARS_LIMIT: u32 = 100;

/// DSCR rate sheet for one pricing epoch.
///
/// Base rates are addressed by (FICO bucket, LTV bucket). Every categorical
/// adjustment row, the loan-size rows and the LTV scale share the same
/// column order. LTVs on this sheet are in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DscrPricing {
    pub limits: DscrProgramLimits,
    pub fico_buckets: FloorScale,
    pub ltv_buckets: CeilingScale,
    pub base_rates: RateMatrix,
    pub property_type: PropertyTypeAdjustments,
    pub purpose: PurposeTable<LtvRow>,
    pub interest_only: IoAdjustments,
    pub prepayment: PrepayAdjustments,
    pub loan_size: BracketTable<LtvRow>,
    /// Maximum LTV (percent) per FICO bucket, by purpose
    pub max_ltv: PurposeTable<Vec<Decimal>>,
    /// Minimum DSCR per FICO bucket
    pub min_dscr: Vec<Decimal>,
}

impl DscrPricing {
    pub fn validate(&self) -> LoanPricerResult<()> {
        self.fico_buckets.validate("dscr.fico_buckets")?;
        self.ltv_buckets.validate("dscr.ltv_buckets")?;
        self.loan_size.validate("dscr.loan_size")?;

        let rows = self.fico_buckets.len();
        let cols = self.ltv_buckets.len();
        self.base_rates.validate("dscr.base_rates", rows, cols)?;

        for p in PropertyType::ALL {
            check_len("dscr.property_type", p.label(), self.property_type.row(p), cols)?;
        }
        for p in LoanPurpose::ALL {
            check_len("dscr.purpose", p.label(), self.purpose.get(p), cols)?;
            check_len("dscr.max_ltv", p.label(), self.max_ltv.get(p), rows)?;
        }
        for io in IoPeriod::ALL {
            check_len("dscr.interest_only", io.label(), self.interest_only.row(io), cols)?;
        }
        for (i, row) in self.loan_size.values().enumerate() {
            check_len("dscr.loan_size", &format!("bracket {i}"), row, cols)?;
        }
        check_len("dscr.min_dscr", "min_dscr", &self.min_dscr, rows)?;

        if self.limits.max_ltv <= Decimal::ZERO {
            return Err(PricingError::config("dscr.limits", "max_ltv must be positive"));
        }
        let limits = &self.limits;
        if limits.max_amount < limits.min_loan
            || limits.max_amount < limits.min_property_value
            || limits.max_amount > AMOUNT_CEILING_LIMIT
        {
            return Err(PricingError::config(
                "dscr.limits",
                format!("max_amount must lie between the program minimums and {AMOUNT_CEILING_LIMIT}"),
            ));
        }
        if limits.max_term_years == 0 || limits.max_term_years > TERM_YEARS_LIMIT {
            return Err(PricingError::config(
                "dscr.limits",
                format!("max_term_years must lie in 1..={TERM_YEARS_LIMIT}"),
            ));
        }
        if limits.default_term_years == 0 || limits.default_term_years > limits.max_term_years {
            return Err(PricingError::config(
                "dscr.limits",
                "default_term_years must lie in 1..=max_term_years",
            ));
        }
        Ok(())
    }
}

fn check_len<T>(table: &str, row: &str, values: &[T], expected: usize) -> LoanPricerResult<()> {
    if values.len() != expected {
        return Err(PricingError::config(
            table,
            format!("{row} has {} entries, expected {expected}", values.len()),
        ));
    }
    Ok(())
}

fn flat(value: Rate, n: usize) -> LtvRow {
    vec![value; n]
}

impl Default for DscrPricing {
    fn default() -> Self {
        let fico_buckets = FloorScale {
            buckets: [680, 700, 720, 740, 760, 780, 800]
                .iter()
                .map(|f| Bucket::new(Decimal::from(*f), &format!("{f}+")))
                .collect(),
        };
        let ltv_buckets = CeilingScale {
            buckets: [50, 55, 60, 65, 70, 75, 80]
                .iter()
                .map(|c| Bucket::new(Decimal::from(*c), &format!("<= {c}%")))
                .collect(),
        };

        let standard_ltv = vec![
            dec!(75),
            dec!(80),
            dec!(80),
            dec!(80),
            dec!(80),
            dec!(80),
            dec!(80),
        ];

        DscrPricing {
            limits: DscrProgramLimits {
                min_fico: 680,
                min_property_value: dec!(115000),
                min_loan: dec!(75000),
                max_ltv: dec!(80),
                max_amount: dec!(1000000000),
                default_term_years: 30,
                max_term_years: 40,
            },
            fico_buckets,
            ltv_buckets,
            base_rates: RateMatrix {
                rows: vec![
                    vec![dec!(0.0630), dec!(0.06325), dec!(0.06475), dec!(0.0655), dec!(0.068), dec!(0.0705), dec!(0.073)],
                    vec![dec!(0.0615), dec!(0.06175), dec!(0.0635), dec!(0.0645), dec!(0.06625), dec!(0.06875), dec!(0.0705)],
                    vec![dec!(0.061), dec!(0.06125), dec!(0.06238), dec!(0.06375), dec!(0.06475), dec!(0.06675), dec!(0.06925)],
                    vec![dec!(0.06075), dec!(0.061), dec!(0.0615), dec!(0.0625), dec!(0.06425), dec!(0.0655), dec!(0.068)],
                    vec![dec!(0.0605), dec!(0.06075), dec!(0.06125), dec!(0.06175), dec!(0.06275), dec!(0.06475), dec!(0.06675)],
                    vec![dec!(0.06025), dec!(0.0605), dec!(0.061), dec!(0.0615), dec!(0.062), dec!(0.063), dec!(0.0655)],
                    vec![dec!(0.06), dec!(0.06025), dec!(0.06075), dec!(0.06125), dec!(0.06175), dec!(0.06275), dec!(0.06525)],
                ],
            },
            property_type: PropertyTypeAdjustments {
                detached_sfr: flat(Decimal::ZERO, 7),
                townhome: flat(Decimal::ZERO, 7),
                pud: flat(Decimal::ZERO, 7),
                sfr_adu: vec![dec!(0.0005), dec!(0.00075), dec!(0.001), dec!(0.00125), dec!(0.0015), dec!(0.00175), dec!(0.002)],
                two_to_four_unit: vec![dec!(0.001), dec!(0.00125), dec!(0.0015), dec!(0.00175), dec!(0.0025), dec!(0.00275), dec!(0.003)],
                condo_warrantable: vec![dec!(0.001), dec!(0.00125), dec!(0.0015), dec!(0.00175), dec!(0.0025), dec!(0.00275), dec!(0.003)],
                condo_non_warrantable: flat(dec!(0.005), 7),
                five_to_nine_unit: flat(dec!(0.005), 7),
                ten_plus_unit: flat(dec!(0.005), 7),
            },
            purpose: PurposeTable {
                purchase: flat(Decimal::ZERO, 7),
                delayed_purchase: flat(Decimal::ZERO, 7),
                rate_term_refi: flat(Decimal::ZERO, 7),
                cash_out_refi: vec![dec!(0.00025), dec!(0.0005), dec!(0.00075), dec!(0.001), dec!(0.00175), dec!(0.0025), dec!(0.01)],
            },
            interest_only: IoAdjustments {
                no_io: flat(Decimal::ZERO, 7),
                five_year: vec![dec!(0.00175), dec!(0.00175), dec!(0.00175), dec!(0.00225), dec!(0.00225), dec!(0.003), dec!(0.003)],
                seven_year: vec![dec!(0.0015), dec!(0.0015), dec!(0.0015), dec!(0.002), dec!(0.002), dec!(0.00275), dec!(0.00275)],
                ten_year: vec![dec!(0.00125), dec!(0.00125), dec!(0.00125), dec!(0.00175), dec!(0.00175), dec!(0.0025), dec!(0.0025)],
            },
            prepayment: PrepayAdjustments {
                five_year_flat: dec!(-0.0025),
                five_year_step_down: dec!(-0.00175),
                three_year_step_down: dec!(0.001),
                two_year_step_down: dec!(0.002),
                one_year: dec!(0.00225),
                no_prepay: dec!(0.00275),
            },
            loan_size: BracketTable::new(vec![
                Bracket::upto(dec!(75000), vec![dec!(0.002), dec!(0.00225), dec!(0.0025), dec!(0.00275), dec!(0.003), dec!(0.003), dec!(0.003)]),
                Bracket::upto(dec!(100000), vec![dec!(0), dec!(0.0005), dec!(0.00075), dec!(0.001), dec!(0.00125), dec!(0.0015), dec!(0.00175)]),
                Bracket::upto(dec!(125000), vec![dec!(0), dec!(0), dec!(0.00025), dec!(0.0005), dec!(0.00075), dec!(0.001), dec!(0.00125)]),
                Bracket::upto(dec!(150000), flat(Decimal::ZERO, 7)),
                Bracket::unbounded(flat(Decimal::ZERO, 7)),
            ]),
            max_ltv: PurposeTable {
                purchase: standard_ltv.clone(),
                delayed_purchase: standard_ltv.clone(),
                rate_term_refi: standard_ltv,
                cash_out_refi: vec![
                    dec!(70),
                    dec!(75),
                    dec!(75),
                    dec!(75),
                    dec!(75),
                    dec!(75),
                    dec!(75),
                ],
            },
            min_dscr: vec![
                dec!(1.20),
                dec!(1.10),
                dec!(1.00),
                dec!(1.00),
                dec!(1.00),
                dec!(1.00),
                dec!(1.00),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sheet_is_consistent() {
        assert!(DscrPricing::default().validate().is_ok());
    }

    #[test]
    fn test_short_adjustment_row_rejected() {
        let mut sheet = DscrPricing::default();
        sheet.interest_only.seven_year.pop();
        let err = sheet.validate().unwrap_err();
        assert!(matches!(err, PricingError::InvalidConfig { ref table, .. } if table == "dscr.interest_only"));
    }

    #[test]
    fn test_program_bounds_checked() {
        let mut sheet = DscrPricing::default();
        sheet.limits.max_term_years = 500;
        assert!(sheet.validate().is_err());

        let mut sheet = DscrPricing::default();
        sheet.limits.default_term_years = 45;
        assert!(sheet.validate().is_err());

        let mut sheet = DscrPricing::default();
        sheet.limits.max_amount = dec!(70000000000000000000000000000);
        assert!(sheet.validate().is_err());

        let mut sheet = DscrPricing::default();
        sheet.limits.max_amount = dec!(50000);
        assert!(sheet.validate().is_err());
    }

    #[test]
    fn test_matrix_shape_tracks_fico_scale() {
        let mut sheet = DscrPricing::default();
        sheet.base_rates.rows.pop();
        assert!(sheet.validate().is_err());
    }

    #[test]
    fn test_rows_resolve_per_selector() {
        let sheet = DscrPricing::default();
        assert_eq!(sheet.property_type.row(PropertyType::TwoToFourUnit)[5], dec!(0.00275));
        assert_eq!(sheet.purpose.get(LoanPurpose::CashOutRefi)[6], dec!(0.01));
        assert_eq!(sheet.interest_only.row(IoPeriod::TenYear)[0], dec!(0.00125));
        assert_eq!(sheet.prepayment.get(PrepayPenalty::None), dec!(0.00275));
        assert_eq!(sheet.max_ltv.get(LoanPurpose::CashOutRefi)[0], dec!(70));
    }
}
