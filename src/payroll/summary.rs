use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::sea_orm_active_enums::PayrollStatus;

const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// One payroll row as seen by the summary report.
#[derive(Debug, Clone)]
pub struct SummaryRow<'a> {
    pub department: Option<&'a str>,
    pub status: PayrollStatus,
    pub gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub net_pay: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBreakdown {
    pub draft: u64,
    pub calculated: u64,
    pub approved: u64,
    pub paid: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepartmentTotals {
    pub employees: u64,
    pub gross_salary: Decimal,
    pub net_pay: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollSummary {
    pub total_employees: u64,
    pub total_gross_salary: Decimal,
    pub total_deductions: Decimal,
    pub total_net_pay: Decimal,
    pub status_breakdown: StatusBreakdown,
    pub department_breakdown: BTreeMap<String, DepartmentTotals>,
}

pub fn summarize<'a>(rows: impl IntoIterator<Item = SummaryRow<'a>>) -> PayrollSummary {
    rows.into_iter().fold(PayrollSummary::default(), |mut summary, row| {
        summary.total_employees += 1;
        summary.total_gross_salary += row.gross_salary;
        summary.total_deductions += row.total_deductions;
        summary.total_net_pay += row.net_pay;

        let counter = match row.status {
            PayrollStatus::Draft => &mut summary.status_breakdown.draft,
            PayrollStatus::Calculated => &mut summary.status_breakdown.calculated,
            PayrollStatus::Approved => &mut summary.status_breakdown.approved,
            PayrollStatus::Paid => &mut summary.status_breakdown.paid,
        };
        *counter += 1;

        let department = summary
            .department_breakdown
            .entry(row.department.unwrap_or(UNASSIGNED_DEPARTMENT).to_owned())
            .or_default();
        department.employees += 1;
        department.gross_salary += row.gross_salary;
        department.net_pay += row.net_pay;

        summary
    })
}
