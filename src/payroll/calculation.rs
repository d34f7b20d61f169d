//! Payslip aggregation.
//!
//! [`calculate_payslip`] turns a salary structure, an attendance record and
//! optional manual overrides into the full earnings/deductions breakdown.
//! Intermediate values are kept exact; only the final amount of each line
//! item is rounded, and the totals are the sums of the rounded lines.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::entity::salary_structure;

use super::{proration, rates::RateTable, round_amount, statutory, words, PayrollError};

pub const BASIC_SALARY: &str = "basicSalary";
pub const HOUSE_RENT_ALLOWANCE: &str = "houseRentAllowance";
pub const CONVEYANCE_ALLOWANCE: &str = "conveyanceAllowance";
pub const MEDICAL_ALLOWANCE: &str = "medicalAllowance";
pub const SPECIAL_ALLOWANCE: &str = "specialAllowance";
pub const LTA: &str = "lta";
pub const SHIFT_ALLOWANCE: &str = "shiftAllowance";
pub const INTERNET_ALLOWANCE: &str = "internetAllowance";
pub const ARREARS: &str = "arrears";
pub const OVERTIME_PAY: &str = "overtimePay";

pub const MEDICAL_PREMIUM: &str = "medicalPremium";
pub const NPS: &str = "nps";
pub const PROFESSIONAL_TAX: &str = "professionalTax";
pub const PROVIDENT_FUND: &str = "providentFund";
pub const TDS: &str = "tds";
pub const VOLUNTARY_PF: &str = "voluntaryPF";
pub const ESIC: &str = "esic";

/// Every hour of a 31-day month.
pub const MAX_OVERTIME_HOURS: i64 = 744;

/// Named amounts of one side of a payslip.
pub type LineItems = BTreeMap<String, Decimal>;

/// Monthly salary components and statutory opt-outs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryComponents {
    pub basic_salary: Decimal,
    pub house_rent_allowance: Decimal,
    pub conveyance_allowance: Decimal,
    pub medical_allowance: Decimal,
    pub special_allowance: Decimal,
    pub lta: Decimal,
    pub shift_allowance: Decimal,
    pub internet_allowance: Decimal,
    pub arrears: Decimal,
    pub medical_premium: Decimal,
    pub nps: Decimal,
    pub voluntary_pf: Decimal,
    pub skip_provident_fund: bool,
    pub skip_esic: bool,
    pub skip_professional_tax: bool,
    pub skip_tds: bool,
}

impl From<&salary_structure::Model> for SalaryComponents {
    fn from(structure: &salary_structure::Model) -> Self {
        Self {
            basic_salary: structure.basic_salary,
            house_rent_allowance: structure.house_rent_allowance,
            conveyance_allowance: structure.conveyance_allowance,
            medical_allowance: structure.medical_allowance,
            special_allowance: structure.special_allowance,
            lta: structure.lta,
            shift_allowance: structure.shift_allowance,
            internet_allowance: structure.internet_allowance,
            arrears: structure.arrears,
            medical_premium: structure.medical_premium,
            nps: structure.nps,
            voluntary_pf: structure.voluntary_pf,
            skip_provident_fund: structure.skip_provident_fund,
            skip_esic: structure.skip_esic,
            skip_professional_tax: structure.skip_professional_tax,
            skip_tds: structure.skip_tds,
        }
    }
}

impl SalaryComponents {
    /// Components scaled by attendance, in payslip order.
    fn prorated(&self) -> [(&'static str, Decimal); 8] {
        [
            (BASIC_SALARY, self.basic_salary),
            (HOUSE_RENT_ALLOWANCE, self.house_rent_allowance),
            (CONVEYANCE_ALLOWANCE, self.conveyance_allowance),
            (MEDICAL_ALLOWANCE, self.medical_allowance),
            (SPECIAL_ALLOWANCE, self.special_allowance),
            (LTA, self.lta),
            (SHIFT_ALLOWANCE, self.shift_allowance),
            (INTERNET_ALLOWANCE, self.internet_allowance),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attendance {
    pub total_working_days: i32,
    pub present_days: i32,
    /// Defaults to the absent days when not recorded separately.
    #[serde(default)]
    pub lop_days: Option<i32>,
    #[serde(default)]
    pub overtime_hours: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineOverride {
    pub name: String,
    pub amount: Decimal,
    /// `amount` is a percentage of the pro-rated basic salary.
    #[serde(default)]
    pub is_percentage: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub earnings: Vec<LineOverride>,
    pub deductions: Vec<LineOverride>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    pub total_working_days: i32,
    pub present_days: i32,
    pub absent_days: i32,
    pub lop_days: i32,
    pub paid_days: i32,
    pub overtime_hours: Decimal,
}

/// Employer-side statutory contributions, reported but never deducted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployerContributions {
    pub provident_fund: Decimal,
    pub esic: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayslipCalculation {
    pub earnings: LineItems,
    pub deductions: LineItems,
    pub attendance: AttendanceSummary,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
    pub net_pay_in_words: String,
    pub employer_contributions: EmployerContributions,
    pub rate_table_version: String,
}

/// Turns a missing salary structure into the error payroll callers report.
pub fn require_structure<T>(structure: Option<T>) -> Result<T, PayrollError> {
    structure.ok_or_else(|| PayrollError::MissingConfiguration("Employee does not have a salary structure assigned".to_owned()))
}

pub fn calculate_payslip(
    structure: &SalaryComponents,
    attendance: &Attendance,
    overrides: &Overrides,
    rates: &RateTable,
) -> Result<PayslipCalculation, PayrollError> {
    let summary = summarize_attendance(attendance)?;
    let (working, present) = (attendance.total_working_days, attendance.present_days);

    let mut raw_earnings = Vec::with_capacity(10);
    for (name, monthly) in structure.prorated() {
        raw_earnings.push((name, proration::prorate(monthly, working, present)?));
    }

    if structure.arrears.is_sign_negative() && !structure.arrears.is_zero() {
        return Err(PayrollError::InvalidInput("arrears must not be negative".to_owned()));
    }
    raw_earnings.push((ARREARS, structure.arrears));

    if summary.overtime_hours > Decimal::ZERO {
        let hourly_rate = structure.basic_salary / Decimal::from(working) / rates.overtime.hours_per_day;
        raw_earnings.push((OVERTIME_PAY, summary.overtime_hours * hourly_rate * rates.overtime.multiplier));
    }

    let prorated_basic = raw_earnings[0].1;
    let raw_gross: Decimal = raw_earnings.iter().map(|(_, amount)| *amount).sum();

    let statutory_or_zero = |skip: bool, amount: Decimal| if skip { Decimal::ZERO } else { amount };

    let raw_deductions = [
        (MEDICAL_PREMIUM, structure.medical_premium),
        (NPS, structure.nps),
        (
            PROFESSIONAL_TAX,
            statutory_or_zero(structure.skip_professional_tax, statutory::professional_tax(raw_gross, &rates.professional_tax)),
        ),
        (
            PROVIDENT_FUND,
            statutory_or_zero(structure.skip_provident_fund, statutory::provident_fund(prorated_basic, &rates.provident_fund)),
        ),
        (TDS, statutory_or_zero(structure.skip_tds, statutory::tds(raw_gross, &rates.tds))),
        (VOLUNTARY_PF, structure.voluntary_pf),
        (ESIC, statutory_or_zero(structure.skip_esic, statutory::esic(raw_gross, &rates.esic))),
    ];

    if raw_deductions.iter().any(|(_, amount)| amount.is_sign_negative() && !amount.is_zero()) {
        return Err(PayrollError::InvalidInput("deductions must not be negative".to_owned()));
    }

    let employer_contributions = EmployerContributions {
        provident_fund: round_amount(statutory_or_zero(
            structure.skip_provident_fund,
            statutory::provident_fund(prorated_basic, &rates.provident_fund),
        )),
        esic: round_amount(statutory_or_zero(structure.skip_esic, statutory::employer_esic(raw_gross, &rates.esic))),
    };

    let mut earnings: LineItems = raw_earnings.into_iter().map(|(name, amount)| (name.to_owned(), round_amount(amount))).collect();
    let mut deductions: LineItems = raw_deductions.into_iter().map(|(name, amount)| (name.to_owned(), round_amount(amount))).collect();

    let mut gross_salary: Decimal = earnings.values().sum();
    let mut total_deductions: Decimal = deductions.values().sum();

    let percentage_base = round_amount(prorated_basic);
    apply_overrides(&mut earnings, &mut gross_salary, &overrides.earnings, percentage_base)?;
    apply_overrides(&mut deductions, &mut total_deductions, &overrides.deductions, percentage_base)?;

    let net_pay = gross_salary - total_deductions;

    Ok(PayslipCalculation {
        earnings,
        deductions,
        attendance: summary,
        gross_salary,
        total_deductions,
        net_pay,
        net_pay_in_words: words::amount_in_words(net_pay),
        employer_contributions,
        rate_table_version: rates.version.clone(),
    })
}

/// Replaces or adds named line items and moves `total` by the difference,
/// leaving every other line untouched.
pub fn apply_overrides(
    items: &mut LineItems,
    total: &mut Decimal,
    overrides: &[LineOverride],
    percentage_base: Decimal,
) -> Result<(), PayrollError> {
    for line in overrides {
        if line.name.trim().is_empty() {
            return Err(PayrollError::InvalidInput("override name must not be empty".to_owned()));
        }

        if line.amount.is_sign_negative() && !line.amount.is_zero() {
            return Err(PayrollError::InvalidInput(format!("override `{}` must not be negative", line.name)));
        }

        let amount = match line.is_percentage {
            true => round_amount(percentage_base * line.amount / Decimal::ONE_HUNDRED),
            false => round_amount(line.amount),
        };

        let previous = items.insert(line.name.clone(), amount).unwrap_or_default();
        *total += amount - previous;
    }

    Ok(())
}

fn summarize_attendance(attendance: &Attendance) -> Result<AttendanceSummary, PayrollError> {
    proration::check_attendance(attendance.total_working_days, attendance.present_days)?;

    let absent_days = attendance.total_working_days - attendance.present_days;
    let lop_days = attendance.lop_days.unwrap_or(absent_days);

    if lop_days < 0 || lop_days > attendance.total_working_days {
        return Err(PayrollError::InvalidInput(format!("LOP days must be between 0 and {}", attendance.total_working_days)));
    }

    // Hours are stored with two decimals; pay is computed from the stored value.
    let overtime_hours = attendance.overtime_hours.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if overtime_hours.is_sign_negative() && !overtime_hours.is_zero() {
        return Err(PayrollError::InvalidInput("overtime hours must not be negative".to_owned()));
    }

    if overtime_hours > Decimal::from(MAX_OVERTIME_HOURS) {
        return Err(PayrollError::InvalidInput(format!("overtime hours must not exceed {MAX_OVERTIME_HOURS}")));
    }

    Ok(AttendanceSummary {
        total_working_days: attendance.total_working_days,
        present_days: attendance.present_days,
        absent_days,
        lop_days,
        paid_days: attendance.present_days,
        overtime_hours,
    })
}
