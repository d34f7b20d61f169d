use rust_decimal::Decimal;

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CreatePayrollData {
    pub(super) employee_id: Uuid,
    pub(super) month: i16,
    pub(super) year: i16,
    /// Weekdays of the month when omitted.
    pub(super) working_days: Option<i32>,
    pub(super) present_days: i32,
    pub(super) lop_days: Option<i32>,
    #[serde(default)]
    pub(super) overtime_hours: Decimal,
    #[serde(default)]
    pub(super) overrides: Overrides,
    pub(super) remarks: Option<String>,
}

/// Replaces the stored attendance or overrides before recomputing.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct RecalculatePayrollData {
    pub(super) working_days: Option<i32>,
    pub(super) present_days: Option<i32>,
    pub(super) lop_days: Option<i32>,
    pub(super) overtime_hours: Option<Decimal>,
    pub(super) overrides: Option<Overrides>,
    pub(super) remarks: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ListPayrollData {
    pub(super) employee_id: Option<Uuid>,
    pub(super) month: Option<i16>,
    pub(super) year: Option<i16>,
    pub(super) status: Option<PayrollStatus>,
    pub(super) page: Option<u64>,
    pub(super) limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct SummaryQuery {
    pub(super) month: i16,
    pub(super) year: i16,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PayrollSummaryResponse {
    pub(super) month: i16,
    pub(super) year: i16,
    #[serde(flatten)]
    pub(super) summary: PayrollSummary,
}
