use rust_decimal::Decimal;

use super::PayrollError;

/// Checks an attendance pair before it is used as a ratio.
pub fn check_attendance(total_working_days: i32, present_days: i32) -> Result<(), PayrollError> {
    if total_working_days <= 0 {
        return Err(PayrollError::InvalidInput("total working days must be greater than zero".to_owned()));
    }

    if present_days < 0 || present_days > total_working_days {
        return Err(PayrollError::InvalidInput(format!(
            "present days must be between 0 and {total_working_days}, got {present_days}"
        )));
    }

    Ok(())
}

/// Scales a monthly component by `present_days / total_working_days`.
pub fn prorate(component: Decimal, total_working_days: i32, present_days: i32) -> Result<Decimal, PayrollError> {
    check_attendance(total_working_days, present_days)?;

    if component.is_sign_negative() && !component.is_zero() {
        return Err(PayrollError::InvalidInput("salary components must not be negative".to_owned()));
    }

    Ok(component * Decimal::from(present_days) / Decimal::from(total_working_days))
}
