use chrono::NaiveDate;

use crate::validation::EmployeeFields;

use super::*;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct CreateEmployee {
    pub(super) employee_code: String,
    pub(super) first_name: String,
    pub(super) last_name: String,
    pub(super) email: String,
    pub(super) department: Option<String>,
    pub(super) position: Option<String>,
    pub(super) hire_date: NaiveDate,
    pub(super) pan_number: Option<String>,
    pub(super) aadhaar_number: Option<String>,
    pub(super) uan_number: Option<String>,
    pub(super) pf_number: Option<String>,
    pub(super) esi_number: Option<String>,
    pub(super) bank_name: Option<String>,
    pub(super) bank_account_number: Option<String>,
    pub(super) ifsc_code: Option<String>,
    pub(super) state: Option<String>,
    pub(super) pin_code: Option<String>,
}

impl CreateEmployee {
    pub(super) fn fields(&self) -> EmployeeFields<'_> {
        EmployeeFields {
            employee_code: Some(&self.employee_code),
            first_name: Some(&self.first_name),
            last_name: Some(&self.last_name),
            email: Some(&self.email),
            pan_number: self.pan_number.as_deref(),
            aadhaar_number: self.aadhaar_number.as_deref(),
            ifsc_code: self.ifsc_code.as_deref(),
            pin_code: self.pin_code.as_deref(),
        }
    }
}

/// Every field is optional; only the ones sent are changed.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct UpdateEmployee {
    pub(super) first_name: Option<String>,
    pub(super) last_name: Option<String>,
    pub(super) email: Option<String>,
    pub(super) department: Option<String>,
    pub(super) position: Option<String>,
    pub(super) status: Option<EmployeeStatus>,
    pub(super) pan_number: Option<String>,
    pub(super) aadhaar_number: Option<String>,
    pub(super) uan_number: Option<String>,
    pub(super) pf_number: Option<String>,
    pub(super) esi_number: Option<String>,
    pub(super) bank_name: Option<String>,
    pub(super) bank_account_number: Option<String>,
    pub(super) ifsc_code: Option<String>,
    pub(super) state: Option<String>,
    pub(super) pin_code: Option<String>,
}

impl UpdateEmployee {
    pub(super) fn fields(&self) -> EmployeeFields<'_> {
        EmployeeFields {
            employee_code: None,
            first_name: self.first_name.as_deref(),
            last_name: self.last_name.as_deref(),
            email: self.email.as_deref(),
            pan_number: self.pan_number.as_deref(),
            aadhaar_number: self.aadhaar_number.as_deref(),
            ifsc_code: self.ifsc_code.as_deref(),
            pin_code: self.pin_code.as_deref(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ListEmployees {
    pub(super) department: Option<String>,
    pub(super) status: Option<EmployeeStatus>,
    /// Matches code, names or email.
    pub(super) search: Option<String>,
    pub(super) page: Option<u64>,
    pub(super) limit: Option<u64>,
}
