//! Field validators run by the handlers before anything is persisted.
//!
//! Each validator returns every violation it finds instead of stopping at the
//! first, so a client can fix a whole form in one round trip.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::payroll::SalaryComponents;

static PAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern compiles"));
static AADHAAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{12}$").expect("Aadhaar pattern compiles"));
static IFSC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("IFSC pattern compiles"));
static PIN_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("PIN pattern compiles"));
static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));
static CURRENCY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Borrowed view of the employee fields that carry a format.
#[derive(Debug, Default)]
pub struct EmployeeFields<'a> {
    pub employee_code: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub pan_number: Option<&'a str>,
    pub aadhaar_number: Option<&'a str>,
    pub ifsc_code: Option<&'a str>,
    pub pin_code: Option<&'a str>,
}

/// Checks an optional formatted field. Empty values are allowed.
fn check_format(field: &str, value: Option<&str>, pattern: &Regex, message: &str, violations: &mut Vec<Violation>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        if !pattern.is_match(value) {
            violations.push(Violation::new(field, message));
        }
    }
}

fn check_present(field: &str, value: Option<&str>, violations: &mut Vec<Violation>) {
    if value.is_some_and(|v| v.trim().is_empty()) {
        violations.push(Violation::new(field, format!("{field} must not be empty")));
    }
}

/// Only fields that are `Some` are checked, so the same validator serves
/// both creation and partial updates.
pub fn validate_employee(fields: &EmployeeFields<'_>) -> Vec<Violation> {
    let mut violations = Vec::new();

    check_present("employee_code", fields.employee_code, &mut violations);
    check_present("first_name", fields.first_name, &mut violations);
    check_present("last_name", fields.last_name, &mut violations);
    check_present("email", fields.email, &mut violations);

    check_format("email", fields.email, &EMAIL, "email must be a valid address", &mut violations);
    check_format("pan_number", fields.pan_number, &PAN, "PAN number must be in valid format (e.g., ABCDE1234F)", &mut violations);
    check_format("aadhaar_number", fields.aadhaar_number, &AADHAAR, "Aadhaar number must be exactly 12 digits", &mut violations);
    check_format("ifsc_code", fields.ifsc_code, &IFSC, "IFSC code must be in valid format (e.g., SBIN0001234)", &mut violations);
    check_format("pin_code", fields.pin_code, &PIN_CODE, "PIN code must be exactly 6 digits", &mut violations);

    violations
}

pub fn validate_salary_structure(components: &SalaryComponents, currency: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    if components.basic_salary <= Decimal::ZERO {
        violations.push(Violation::new("basic_salary", "Basic salary is required and must be greater than 0"));
    }

    let amounts = [
        ("house_rent_allowance", components.house_rent_allowance),
        ("conveyance_allowance", components.conveyance_allowance),
        ("medical_allowance", components.medical_allowance),
        ("special_allowance", components.special_allowance),
        ("lta", components.lta),
        ("shift_allowance", components.shift_allowance),
        ("internet_allowance", components.internet_allowance),
        ("arrears", components.arrears),
        ("medical_premium", components.medical_premium),
        ("nps", components.nps),
        ("voluntary_pf", components.voluntary_pf),
    ];

    for (field, amount) in amounts {
        if amount < Decimal::ZERO {
            violations.push(Violation::new(field, format!("{field} cannot be negative")));
        }
    }

    if !CURRENCY.is_match(currency) {
        violations.push(Violation::new("currency", "currency must be a three-letter ISO code"));
    }

    violations
}

pub fn validate_period(month: i16, year: i16) -> Vec<Violation> {
    let mut violations = Vec::new();

    if !(1..=12).contains(&month) {
        violations.push(Violation::new("month", "month must be between 1 and 12"));
    }

    if !(2000..=2100).contains(&year) {
        violations.push(Violation::new("year", "year must be between 2000 and 2100"));
    }

    violations
}
