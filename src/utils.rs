use chrono::{Datelike as _, Days, Month, NaiveDate, Weekday};

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = match month {
        12 => NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
        _ => NaiveDate::from_ymd_opt(year, month + 1, 1)?,
    };

    Some((start, next.pred_opt()?))
}

/// Weekdays (Monday to Friday) between `start` and `end`, both inclusive.
pub fn count_working_days(mut start: NaiveDate, end: NaiveDate) -> i32 {
    let mut working_days = 0;

    while start <= end {
        if start.weekday() != Weekday::Sat && start.weekday() != Weekday::Sun {
            working_days += 1;
        }

        let Some(next) = start.checked_add_days(Days::new(1)) else {
            break
        };
        start = next;
    }

    working_days
}

/// "October 2026"
pub fn pay_period_label(year: i32, month: u32) -> Option<String> {
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;

    Some(format!("{} {year}", month.name()))
}

pub fn payslip_number(year: i32, month: u32, employee_code: &str) -> String {
    format!("PS{year}{month:02}{employee_code}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

        assert_eq!(month_bounds(2024, 2), Some((date(2024, 2, 1), date(2024, 2, 29))));
        assert_eq!(month_bounds(2025, 12), Some((date(2025, 12, 1), date(2025, 12, 31))));
        assert_eq!(month_bounds(2025, 13), None);
    }

    #[test]
    fn test_count_working_days() {
        let (period_start, period_end) = month_bounds(2024, 6).unwrap();

        assert_eq!(count_working_days(period_start, period_end), 20);
        assert_eq!(count_working_days(period_end, period_start), 0);
    }

    #[test]
    fn test_pay_period_label() {
        assert_eq!(pay_period_label(2026, 10).as_deref(), Some("October 2026"));
        assert_eq!(pay_period_label(2026, 0), None);
    }

    #[test]
    fn test_payslip_number() {
        assert_eq!(payslip_number(2026, 4, "EMP0001"), "PS202604EMP0001");
    }
}
