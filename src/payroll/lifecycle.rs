//! Allowed state changes for payslips and payroll data.
//!
//! Payslips move `draft -> finalized -> paid`, may be cancelled before they
//! are paid, and never move backwards past `paid`. Finalized payslips are
//! locked; edits need an explicit force, and nothing edits a paid or
//! cancelled payslip.

use crate::entity::sea_orm_active_enums::{PayrollStatus, PayslipStatus};

use super::PayrollError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub status: PayslipStatus,
    pub is_locked: bool,
}

fn invalid(action: &'static str, from: impl std::fmt::Debug) -> PayrollError {
    PayrollError::InvalidTransition {
        action,
        from: format!("{from:?}").to_lowercase(),
    }
}

pub fn ensure_editable(status: PayslipStatus, is_locked: bool, force: bool) -> Result<(), PayrollError> {
    match status {
        PayslipStatus::Paid | PayslipStatus::Cancelled => Err(PayrollError::LockedResource(format!(
            "Cannot modify a {} payslip",
            format!("{status:?}").to_lowercase()
        ))),
        _ if is_locked && !force => Err(PayrollError::LockedResource("Cannot modify locked payslip".to_owned())),
        _ => Ok(()),
    }
}

pub fn finalize(status: PayslipStatus) -> Result<Transition, PayrollError> {
    match status {
        PayslipStatus::Draft => Ok(Transition {
            status: PayslipStatus::Finalized,
            is_locked: true,
        }),
        other => Err(invalid("finalize", other)),
    }
}

pub fn mark_paid(status: PayslipStatus) -> Result<Transition, PayrollError> {
    match status {
        PayslipStatus::Finalized => Ok(Transition {
            status: PayslipStatus::Paid,
            is_locked: true,
        }),
        other => Err(invalid("mark as paid", other)),
    }
}

pub fn cancel(status: PayslipStatus) -> Result<Transition, PayrollError> {
    match status {
        PayslipStatus::Draft | PayslipStatus::Finalized => Ok(Transition {
            status: PayslipStatus::Cancelled,
            is_locked: true,
        }),
        other => Err(invalid("cancel", other)),
    }
}

/// Force-unlock: a finalized payslip goes back to an editable draft.
pub fn unlock(status: PayslipStatus) -> Result<Transition, PayrollError> {
    match status {
        PayslipStatus::Finalized => Ok(Transition {
            status: PayslipStatus::Draft,
            is_locked: false,
        }),
        PayslipStatus::Paid | PayslipStatus::Cancelled => {
            Err(PayrollError::LockedResource(format!("Cannot unlock a {} payslip", format!("{status:?}").to_lowercase())))
        }
        PayslipStatus::Draft => Err(invalid("unlock", status)),
    }
}

pub fn ensure_recalculable(status: PayrollStatus) -> Result<(), PayrollError> {
    match status {
        PayrollStatus::Draft | PayrollStatus::Calculated => Ok(()),
        other => Err(invalid("recalculate", other)),
    }
}

pub fn approve(status: PayrollStatus) -> Result<PayrollStatus, PayrollError> {
    match status {
        PayrollStatus::Calculated => Ok(PayrollStatus::Approved),
        other => Err(invalid("approve", other)),
    }
}

pub fn ensure_approved(status: PayrollStatus) -> Result<(), PayrollError> {
    match status {
        PayrollStatus::Approved => Ok(()),
        other => Err(invalid("generate a payslip from", other)),
    }
}

pub fn settle(status: PayrollStatus) -> Result<PayrollStatus, PayrollError> {
    match status {
        PayrollStatus::Approved => Ok(PayrollStatus::Paid),
        other => Err(invalid("settle", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payslip_happy_path() {
        let finalized = finalize(PayslipStatus::Draft).unwrap();
        assert_eq!(finalized, Transition { status: PayslipStatus::Finalized, is_locked: true });

        let paid = mark_paid(finalized.status).unwrap();
        assert_eq!(paid, Transition { status: PayslipStatus::Paid, is_locked: true });
    }

    #[test]
    fn test_payslip_transitions_are_one_way() {
        assert!(matches!(finalize(PayslipStatus::Paid), Err(PayrollError::InvalidTransition { .. })));
        assert!(matches!(finalize(PayslipStatus::Finalized), Err(PayrollError::InvalidTransition { .. })));
        assert!(matches!(mark_paid(PayslipStatus::Draft), Err(PayrollError::InvalidTransition { .. })));
        assert!(matches!(cancel(PayslipStatus::Paid), Err(PayrollError::InvalidTransition { .. })));
        assert!(matches!(unlock(PayslipStatus::Paid), Err(PayrollError::LockedResource(_))));
        assert!(matches!(unlock(PayslipStatus::Draft), Err(PayrollError::InvalidTransition { .. })));

        assert_eq!(cancel(PayslipStatus::Finalized).unwrap().status, PayslipStatus::Cancelled);
        assert_eq!(unlock(PayslipStatus::Finalized).unwrap(), Transition { status: PayslipStatus::Draft, is_locked: false });
    }

    #[test]
    fn test_lock_enforcement() {
        assert_eq!(ensure_editable(PayslipStatus::Draft, false, false), Ok(()));
        assert!(matches!(ensure_editable(PayslipStatus::Finalized, true, false), Err(PayrollError::LockedResource(_))));
        assert_eq!(ensure_editable(PayslipStatus::Finalized, true, true), Ok(()));
        assert!(matches!(ensure_editable(PayslipStatus::Paid, true, true), Err(PayrollError::LockedResource(_))));
        assert!(matches!(ensure_editable(PayslipStatus::Cancelled, true, true), Err(PayrollError::LockedResource(_))));
    }

    #[test]
    fn test_payroll_workflow() {
        assert_eq!(ensure_recalculable(PayrollStatus::Calculated), Ok(()));
        assert!(ensure_recalculable(PayrollStatus::Approved).is_err());
        assert_eq!(approve(PayrollStatus::Calculated), Ok(PayrollStatus::Approved));
        assert!(approve(PayrollStatus::Draft).is_err());
        assert_eq!(ensure_approved(PayrollStatus::Approved), Ok(()));
        assert!(ensure_approved(PayrollStatus::Paid).is_err());
        assert_eq!(settle(PayrollStatus::Approved), Ok(PayrollStatus::Paid));

        let err = approve(PayrollStatus::Paid).unwrap_err();
        assert_eq!(err.to_string(), "cannot approve a record in `paid` state");
    }
}
