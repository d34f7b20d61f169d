use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CreateTemplate {
    pub(super) name: String,
    pub(super) earnings_fields: Vec<String>,
    pub(super) deductions_fields: Vec<String>,
    #[serde(default)]
    pub(super) is_default: bool,
}

/// One visible row of a rendered payslip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Line {
    pub(crate) name: String,
    pub(crate) amount: Decimal,
}
