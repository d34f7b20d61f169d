use chrono::NaiveDate;

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CreateSalaryStructure {
    pub(super) employee_id: Uuid,
    #[serde(flatten)]
    pub(super) components: SalaryComponents,
    pub(super) currency: Option<String>,
    /// Defaults to today.
    pub(super) effective_from: Option<NaiveDate>,
}
