use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CalculatePayslip {
    /// Loads the employee's active structure when no inline structure is given.
    pub(super) employee_id: Option<Uuid>,
    pub(super) structure: Option<SalaryComponents>,
    pub(super) attendance: Attendance,
    #[serde(default)]
    pub(super) overrides: Overrides,
    pub(super) month: Option<i16>,
    pub(super) year: Option<i16>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct GeneratePayslip {
    pub(super) payroll_data_id: Uuid,
    pub(super) template_id: Option<Uuid>,
    pub(super) payment_mode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct BulkGeneratePayslips {
    pub(super) payroll_data_ids: Vec<Uuid>,
    pub(super) template_id: Option<Uuid>,
    pub(super) payment_mode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(super) enum BulkOutcome {
    Generated { payroll_data_id: Uuid, payslip: Box<payslip::Model> },
    Failed { payroll_data_id: Uuid, message: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct BulkGenerateResponse {
    pub(super) generated: usize,
    pub(super) failed: usize,
    pub(super) results: Vec<BulkOutcome>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ListPayslips {
    pub(super) employee_id: Option<Uuid>,
    pub(super) month: Option<i16>,
    pub(super) year: Option<i16>,
    pub(super) status: Option<PayslipStatus>,
    pub(super) page: Option<u64>,
    pub(super) limit: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ViewQuery {
    pub(super) template_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PayslipView {
    pub(super) payslip: payslip::Model,
    pub(super) template_id: Option<Uuid>,
    pub(super) earnings: Vec<Line>,
    pub(super) deductions: Vec<Line>,
}

/// A manual correction. Omitted sides keep their stored line items.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct UpdatePayslip {
    pub(super) earnings: Option<LineItems>,
    pub(super) deductions: Option<LineItems>,
    pub(super) payment_mode: Option<String>,
    pub(super) reason: String,
    #[serde(default)]
    pub(super) force: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct MarkPaid {
    pub(super) payment_method: Option<String>,
    pub(super) payment_reference: Option<String>,
}

/// Employee details as they were when the payslip was generated.
#[derive(Debug, Serialize, Deserialize)]
pub(super) struct EmployeeInfo {
    pub(super) employee_code: String,
    pub(super) name: String,
    pub(super) email: String,
    pub(super) department: Option<String>,
    pub(super) position: Option<String>,
    pub(super) hire_date: NaiveDate,
    pub(super) pan_number: Option<String>,
    pub(super) uan_number: Option<String>,
    pub(super) pf_number: Option<String>,
    pub(super) esi_number: Option<String>,
    pub(super) bank_name: Option<String>,
    pub(super) bank_account_number: Option<String>,
    pub(super) ifsc_code: Option<String>,
}

impl From<&employee::Model> for EmployeeInfo {
    fn from(employee: &employee::Model) -> Self {
        Self {
            employee_code: employee.employee_code.clone(),
            name: employee.full_name(),
            email: employee.email.clone(),
            department: employee.department.clone(),
            position: employee.position.clone(),
            hire_date: employee.hire_date,
            pan_number: employee.pan_number.clone(),
            uan_number: employee.uan_number.clone(),
            pf_number: employee.pf_number.clone(),
            esi_number: employee.esi_number.clone(),
            bank_name: employee.bank_name.clone(),
            bank_account_number: employee.bank_account_number.clone(),
            ifsc_code: employee.ifsc_code.clone(),
        }
    }
}
