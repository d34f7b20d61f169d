//! Versioned statutory rate tables.
//!
//! A [`RateTable`] holds every threshold and rate the deduction formulas
//! need. Tables are keyed by the date they take effect so a pay period is
//! always computed with the rules that applied at its start, including when
//! an old period is recomputed after the rules change.

use std::path::Path;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::PayrollError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub version: String,
    pub effective_from: NaiveDate,
    pub provident_fund: ProvidentFundRule,
    pub esic: EsicRule,
    /// Ascending slabs; the last one must be open-ended.
    pub professional_tax: Vec<ProfessionalTaxSlab>,
    pub tds: TdsRule,
    pub overtime: OvertimeRule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidentFundRule {
    pub wage_ceiling: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsicRule {
    /// Gross above this pays nothing. Exactly the ceiling still pays.
    pub gross_ceiling: Decimal,
    pub employee_rate: Decimal,
    pub employer_rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalTaxSlab {
    /// Inclusive upper bound of the slab, `None` for the top slab.
    pub up_to: Option<Decimal>,
    pub amount: Decimal,
}

/// Flat-rate approximation of income tax withheld per month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TdsRule {
    pub annual_exemption: Decimal,
    pub rate: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertimeRule {
    pub hours_per_day: Decimal,
    pub multiplier: Decimal,
}

impl RateTable {
    /// The rules the payroll has always run with.
    pub fn baseline() -> Self {
        Self {
            version: "IN-2020.1".to_owned(),
            effective_from: NaiveDate::from_ymd_opt(2020, 4, 1).expect("baseline date is a valid calendar date"),
            provident_fund: ProvidentFundRule {
                wage_ceiling: dec!(15000),
                rate: dec!(0.12),
            },
            esic: EsicRule {
                gross_ceiling: dec!(25000),
                employee_rate: dec!(0.0075),
                employer_rate: dec!(0.0325),
            },
            professional_tax: vec![
                ProfessionalTaxSlab { up_to: Some(dec!(21000)), amount: dec!(0) },
                ProfessionalTaxSlab { up_to: Some(dec!(25000)), amount: dec!(150) },
                ProfessionalTaxSlab { up_to: None, amount: dec!(200) },
            ],
            tds: TdsRule {
                annual_exemption: dec!(250000),
                rate: dec!(0.05),
            },
            overtime: OvertimeRule {
                hours_per_day: dec!(8),
                multiplier: dec!(1.5),
            },
        }
    }

    pub fn validate(&self) -> Result<(), PayrollError> {
        let invalid = |reason: &str| Err(PayrollError::InvalidInput(format!("rate table `{}`: {reason}", self.version)));

        if self.version.trim().is_empty() {
            return Err(PayrollError::InvalidInput("rate table version must not be empty".to_owned()));
        }

        let Some((top, lower)) = self.professional_tax.split_last() else {
            return invalid("professional tax needs at least one slab");
        };

        if top.up_to.is_some() {
            return invalid("the last professional tax slab must be open-ended");
        }

        let mut previous = None;
        for slab in lower {
            let Some(limit) = slab.up_to else {
                return invalid("only the last professional tax slab may be open-ended");
            };

            if previous.is_some_and(|prev| limit <= prev) {
                return invalid("professional tax slabs must be strictly ascending");
            }

            previous = Some(limit);
        }

        if self.overtime.hours_per_day <= Decimal::ZERO {
            return invalid("overtime hours per day must be positive");
        }

        let rates = [self.provident_fund.rate, self.esic.employee_rate, self.esic.employer_rate, self.tds.rate];
        if rates.iter().any(|rate| rate.is_sign_negative()) {
            return invalid("rates must not be negative");
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum RateBookError {
    #[error("unable to read rate tables")]
    Io(#[from] std::io::Error),

    #[error("rate tables are not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] PayrollError),
}

/// All known rate tables ordered by `effective_from`.
#[derive(Debug, Clone)]
pub struct RateBook {
    tables: Vec<RateTable>,
}

impl Default for RateBook {
    fn default() -> Self {
        Self { tables: vec![RateTable::baseline()] }
    }
}

impl RateBook {
    pub fn new(mut tables: Vec<RateTable>) -> Result<Self, PayrollError> {
        if tables.is_empty() {
            return Err(PayrollError::InvalidInput("at least one rate table is required".to_owned()));
        }

        for table in &tables {
            table.validate()?;
        }

        tables.sort_by_key(|table| table.effective_from);

        if let Some(pair) = tables.windows(2).find(|pair| pair[0].effective_from == pair[1].effective_from) {
            return Err(PayrollError::InvalidInput(format!(
                "rate tables `{}` and `{}` take effect on the same day",
                pair[0].version, pair[1].version
            )));
        }

        Ok(Self { tables })
    }

    pub fn from_json(json: &str) -> Result<Self, RateBookError> {
        let tables: Vec<RateTable> = serde_json::from_str(json)?;

        Ok(Self::new(tables)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RateBookError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// The table in force on `date`.
    pub fn effective_on(&self, date: NaiveDate) -> Result<&RateTable, PayrollError> {
        self.tables
            .iter()
            .rev()
            .find(|table| table.effective_from <= date)
            .ok_or_else(|| PayrollError::MissingConfiguration(format!("no statutory rate table is in effect on {date}")))
    }

    pub fn tables(&self) -> &[RateTable] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_baseline_is_valid() {
        assert_eq!(RateTable::baseline().validate(), Ok(()));
    }

    #[test]
    fn test_effective_on_picks_latest_started_table() {
        let mut revised = RateTable::baseline();
        revised.version = "IN-2026.1".to_owned();
        revised.effective_from = date(2026, 4, 1);
        revised.provident_fund.wage_ceiling = dec!(21000);

        let book = RateBook::new(vec![revised, RateTable::baseline()]).unwrap();

        assert_eq!(book.effective_on(date(2026, 3, 1)).unwrap().version, "IN-2020.1");
        assert_eq!(book.effective_on(date(2026, 4, 1)).unwrap().version, "IN-2026.1");
        assert_eq!(book.effective_on(date(2030, 1, 1)).unwrap().version, "IN-2026.1");
        assert!(matches!(book.effective_on(date(2019, 1, 1)), Err(PayrollError::MissingConfiguration(_))));
    }

    #[test]
    fn test_rejects_bad_tables() {
        let mut closed = RateTable::baseline();
        closed.professional_tax.pop();
        assert!(closed.validate().is_err());

        let mut unordered = RateTable::baseline();
        unordered.professional_tax.swap(0, 1);
        assert!(unordered.validate().is_err());

        assert!(RateBook::new(vec![]).is_err());
        assert!(RateBook::new(vec![RateTable::baseline(), RateTable::baseline()]).is_err());
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::to_string(&vec![RateTable::baseline()]).unwrap();
        let book = RateBook::from_json(&json).unwrap();

        assert_eq!(book.tables(), &[RateTable::baseline()]);
        assert!(matches!(RateBook::from_json("{"), Err(RateBookError::Json(_))));
    }
}
