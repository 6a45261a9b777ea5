//! Long-term rental (DSCR) loans.

pub mod dscr;
pub mod rate_sheet;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coerce::parse_choice;
use crate::error::PricingError;

pub use dscr::{calculate, DscrQuote, DscrScenario, PaymentBasis};
pub use rate_sheet::{
    DscrPricing, DscrProgramLimits, IoAdjustments, PrepayAdjustments, PropertyTypeAdjustments,
    PurposeTable,
};

// ---------------------------------------------------------------------------
// Scenario selectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    #[serde(rename = "Detached SFR", alias = "detached_sfr")]
    DetachedSfr,
    #[serde(rename = "Townhome", alias = "townhome")]
    Townhome,
    #[serde(rename = "PUD", alias = "pud")]
    Pud,
    #[serde(rename = "SFR + ADU", alias = "sfr_adu")]
    SfrAdu,
    #[serde(rename = "2-4 Unit", alias = "two_to_four_unit")]
    TwoToFourUnit,
    #[serde(rename = "Condo (Warrantable)", alias = "condo_warrantable")]
    CondoWarrantable,
    #[serde(rename = "Condo (Non-Warr.)", alias = "condo_non_warrantable")]
    CondoNonWarrantable,
    #[serde(rename = "5-9 Unit", alias = "five_to_nine_unit")]
    FiveToNineUnit,
    #[serde(rename = "10+ Unit", alias = "ten_plus_unit")]
    TenPlusUnit,
}

impl PropertyType {
    pub const ALL: [PropertyType; 9] = [
        PropertyType::DetachedSfr,
        PropertyType::Townhome,
        PropertyType::Pud,
        PropertyType::SfrAdu,
        PropertyType::TwoToFourUnit,
        PropertyType::CondoWarrantable,
        PropertyType::CondoNonWarrantable,
        PropertyType::FiveToNineUnit,
        PropertyType::TenPlusUnit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PropertyType::DetachedSfr => "Detached SFR",
            PropertyType::Townhome => "Townhome",
            PropertyType::Pud => "PUD",
            PropertyType::SfrAdu => "SFR + ADU",
            PropertyType::TwoToFourUnit => "2-4 Unit",
            PropertyType::CondoWarrantable => "Condo (Warrantable)",
            PropertyType::CondoNonWarrantable => "Condo (Non-Warr.)",
            PropertyType::FiveToNineUnit => "5-9 Unit",
            PropertyType::TenPlusUnit => "10+ Unit",
        }
    }
}

impl FromStr for PropertyType {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "property type")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanPurpose {
    #[default]
    #[serde(rename = "Purchase", alias = "purchase")]
    Purchase,
    #[serde(rename = "Delayed Purchase", alias = "delayed_purchase")]
    DelayedPurchase,
    #[serde(rename = "Rate/Term Refi", alias = "rate_term_refi", alias = "Rate-Term Refi")]
    RateTermRefi,
    #[serde(rename = "Cash-Out Refi", alias = "cash_out_refi")]
    CashOutRefi,
}

impl LoanPurpose {
    pub const ALL: [LoanPurpose; 4] = [
        LoanPurpose::Purchase,
        LoanPurpose::DelayedPurchase,
        LoanPurpose::RateTermRefi,
        LoanPurpose::CashOutRefi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LoanPurpose::Purchase => "Purchase",
            LoanPurpose::DelayedPurchase => "Delayed Purchase",
            LoanPurpose::RateTermRefi => "Rate/Term Refi",
            LoanPurpose::CashOutRefi => "Cash-Out Refi",
        }
    }
}

impl FromStr for LoanPurpose {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "loan purpose")
    }
}

/// Interest-only period before amortization starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IoPeriod {
    #[default]
    #[serde(rename = "No IO", alias = "none")]
    None,
    #[serde(rename = "5Y IO", alias = "five_year")]
    FiveYear,
    #[serde(rename = "7Y IO", alias = "seven_year")]
    SevenYear,
    #[serde(rename = "10Y IO", alias = "ten_year")]
    TenYear,
}

impl IoPeriod {
    pub const ALL: [IoPeriod; 4] = [
        IoPeriod::None,
        IoPeriod::FiveYear,
        IoPeriod::SevenYear,
        IoPeriod::TenYear,
    ];

    pub fn is_interest_only(self) -> bool {
        self != IoPeriod::None
    }

    pub fn label(self) -> &'static str {
        match self {
            IoPeriod::None => "No IO",
            IoPeriod::FiveYear => "5Y IO",
            IoPeriod::SevenYear => "7Y IO",
            IoPeriod::TenYear => "10Y IO",
        }
    }
}

impl FromStr for IoPeriod {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "interest-only option")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrepayPenalty {
    #[default]
    #[serde(rename = "5y (5% Flat)", alias = "five_year_flat")]
    FiveYearFlat,
    #[serde(rename = "5y (Step-Down)", alias = "five_year_step_down")]
    FiveYearStepDown,
    #[serde(rename = "3y (Step-Down)", alias = "three_year_step_down")]
    ThreeYearStepDown,
    #[serde(rename = "2y (Step-Down)", alias = "two_year_step_down")]
    TwoYearStepDown,
    #[serde(rename = "1y (1%)", alias = "one_year")]
    OneYear,
    #[serde(rename = "No Prepay", alias = "none")]
    None,
}

impl PrepayPenalty {
    pub const ALL: [PrepayPenalty; 6] = [
        PrepayPenalty::FiveYearFlat,
        PrepayPenalty::FiveYearStepDown,
        PrepayPenalty::ThreeYearStepDown,
        PrepayPenalty::TwoYearStepDown,
        PrepayPenalty::OneYear,
        PrepayPenalty::None,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PrepayPenalty::FiveYearFlat => "5y (5% Flat)",
            PrepayPenalty::FiveYearStepDown => "5y (Step-Down)",
            PrepayPenalty::ThreeYearStepDown => "3y (Step-Down)",
            PrepayPenalty::TwoYearStepDown => "2y (Step-Down)",
            PrepayPenalty::OneYear => "1y (1%)",
            PrepayPenalty::None => "No Prepay",
        }
    }
}

impl FromStr for PrepayPenalty {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice(s, "prepayment option")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectors_parse_labels_and_names() {
        assert_eq!("SFR + ADU".parse::<PropertyType>().unwrap(), PropertyType::SfrAdu);
        assert_eq!("ten_plus_unit".parse::<PropertyType>().unwrap(), PropertyType::TenPlusUnit);
        assert_eq!("Cash-Out Refi".parse::<LoanPurpose>().unwrap(), LoanPurpose::CashOutRefi);
        assert_eq!("Rate-Term Refi".parse::<LoanPurpose>().unwrap(), LoanPurpose::RateTermRefi);
        assert_eq!("7Y IO".parse::<IoPeriod>().unwrap(), IoPeriod::SevenYear);
        assert_eq!("1y (1%)".parse::<PrepayPenalty>().unwrap(), PrepayPenalty::OneYear);
    }

    #[test]
    fn test_unknown_selector_is_rejected() {
        let err = "Duplex".parse::<PropertyType>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid scenario: unknown property type 'Duplex'");
    }

    #[test]
    fn test_labels_round_trip_through_parsing() {
        for p in PropertyType::ALL {
            assert_eq!(p.label().parse::<PropertyType>().unwrap(), p);
        }
        for p in PrepayPenalty::ALL {
            assert_eq!(p.label().parse::<PrepayPenalty>().unwrap(), p);
        }
    }

    #[test]
    fn test_only_no_io_amortizes() {
        assert!(!IoPeriod::None.is_interest_only());
        assert!(IoPeriod::ALL[1..].iter().all(|io| io.is_interest_only()));
    }
}
