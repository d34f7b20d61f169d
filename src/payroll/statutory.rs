//! Statutory deductions. Each rule is a function of one amount and its
//! rate-table entry; none of them round.

use rust_decimal::Decimal;

use super::rates::{EsicRule, ProfessionalTaxSlab, ProvidentFundRule, TdsRule};

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

pub fn professional_tax(gross: Decimal, slabs: &[ProfessionalTaxSlab]) -> Decimal {
    slabs
        .iter()
        .find(|slab| slab.up_to.is_none_or(|limit| gross <= limit))
        .map(|slab| slab.amount)
        .unwrap_or_default()
}

pub fn provident_fund(basic_salary: Decimal, rule: &ProvidentFundRule) -> Decimal {
    basic_salary.min(rule.wage_ceiling) * rule.rate
}

pub fn esic(gross: Decimal, rule: &EsicRule) -> Decimal {
    if gross > rule.gross_ceiling {
        return Decimal::ZERO;
    }

    gross * rule.employee_rate
}

pub fn employer_esic(gross: Decimal, rule: &EsicRule) -> Decimal {
    if gross > rule.gross_ceiling {
        return Decimal::ZERO;
    }

    gross * rule.employer_rate
}

/// Monthly TDS as a flat rate over the annualised gross above the
/// exemption. Not a slab computation.
pub fn tds(gross: Decimal, rule: &TdsRule) -> Decimal {
    let annual_salary = gross * MONTHS_PER_YEAR;

    if annual_salary <= rule.annual_exemption {
        return Decimal::ZERO;
    }

    (annual_salary - rule.annual_exemption) * rule.rate / MONTHS_PER_YEAR
}
