//! Payroll arithmetic and payslip state rules.
//!
//! Everything in here is pure: no database access, no clock reads. Route
//! handlers load the records, hand plain values to these functions and
//! persist what comes back.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

pub mod calculation;
pub mod lifecycle;
pub mod proration;
pub mod rates;
pub mod statutory;
pub mod summary;
pub mod words;

pub use calculation::{calculate_payslip, require_structure, Attendance, LineItems, Overrides, PayslipCalculation, SalaryComponents};
pub use rates::RateBook;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayrollError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    MissingConfiguration(String),

    #[error("{0}")]
    LockedResource(String),

    #[error("cannot {action} a record in `{from}` state")]
    InvalidTransition {
        action: &'static str,
        from: String,
    },
}

/// Rounds a final monetary amount to paise, half away from zero.
pub fn round_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
