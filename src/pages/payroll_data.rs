use std::str::FromStr;

use actix_web::{dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use futures_util::future::LocalBoxFuture;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::HrOrAdmin,
    entity::{payroll_data, prelude::*, sea_orm_active_enums::PayrollStatus, user},
    error::{ensure_valid, AppError},
    pages::{salary_structure::active_structure, Page, PageQuery},
    payroll::{calculate_payslip, lifecycle, require_structure, summary::{summarize, PayrollSummary, SummaryRow}, Attendance, Overrides, PayslipCalculation, RateBook, SalaryComponents},
    utils, validation,
};

use extractor::RecalculablePayrollData;
use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_payroll_data)
        .service(list_payroll_data)
        .service(payroll_summary)
        .service(recalculate_payroll_data)
        .service(approve_payroll_data)
        .service(get_payroll_data);
}

/// First and last calendar day of the pay period.
pub(super) fn period_bounds(month: i16, year: i16) -> Result<(NaiveDate, NaiveDate), AppError> {
    u32::try_from(month).ok()
        .and_then(|month| utils::month_bounds(year.into(), month))
        .ok_or_else(|| AppError::InvalidInput(format!("{year}-{month} is not a valid pay period")))
}

/// Runs the payroll calculation with the rate table in force when the period starts.
pub(super) fn calculate_for_period(
    rate_book: &RateBook,
    components: &SalaryComponents,
    attendance: &Attendance,
    overrides: &Overrides,
    period_start: NaiveDate,
) -> Result<PayslipCalculation, AppError> {
    let rates = rate_book.effective_on(period_start)?;

    Ok(calculate_payslip(components, attendance, overrides, rates)?)
}

fn apply_calculation(model: &mut payroll_data::ActiveModel, calculation: &PayslipCalculation, overrides: &Overrides) -> Result<(), AppError> {
    model.working_days = Set(calculation.attendance.total_working_days);
    model.present_days = Set(calculation.attendance.present_days);
    model.absent_days = Set(calculation.attendance.absent_days);
    model.lop_days = Set(calculation.attendance.lop_days);
    model.overtime_hours = Set(calculation.attendance.overtime_hours);
    model.overrides = Set(serde_json::to_value(overrides)?);
    model.earnings = Set(serde_json::to_value(&calculation.earnings)?);
    model.deductions = Set(serde_json::to_value(&calculation.deductions)?);
    model.employer_contributions = Set(serde_json::to_value(&calculation.employer_contributions)?);
    model.gross_salary = Set(calculation.gross_salary);
    model.total_deductions = Set(calculation.total_deductions);
    model.net_pay = Set(calculation.net_pay);
    model.rate_table_version = Set(calculation.rate_table_version.clone());
    model.status = Set(PayrollStatus::Calculated);

    Ok(())
}

#[post("")]
async fn create_payroll_data(
    db: web::Data<DatabaseConnection>,
    rate_book: web::Data<RateBook>,
    staff: HrOrAdmin,
    payload: web::Json<CreatePayrollData>,
) -> Result<impl Responder, AppError> {
    ensure_valid(validation::validate_period(payload.month, payload.year))?;
    let (period_start, period_end) = period_bounds(payload.month, payload.year)?;

    let employee = Employee::find_by_id(payload.employee_id)
        .one(db.get_ref()).await?
        .ok_or_else(|| AppError::not_found("Employee"))?;

    let existing = PayrollData::find()
        .filter(payroll_data::Column::EmployeeId.eq(employee.id))
        .filter(payroll_data::Column::Month.eq(payload.month))
        .filter(payroll_data::Column::Year.eq(payload.year))
        .one(db.get_ref()).await?;

    if existing.is_some() {
        warn!(employee_id = %employee.id, month = payload.month, year = payload.year, "Rejected duplicate payroll data");
        return Err(AppError::DuplicateResource("Payroll data already exists for this employee and period".to_owned()));
    }

    let structure = require_structure(active_structure(db.get_ref(), employee.id).await?)?;

    let attendance = Attendance {
        total_working_days: payload.working_days.unwrap_or_else(|| utils::count_working_days(period_start, period_end)),
        present_days: payload.present_days,
        lop_days: payload.lop_days,
        overtime_hours: payload.overtime_hours,
    };

    let calculation = calculate_for_period(&rate_book, &SalaryComponents::from(&structure), &attendance, &payload.overrides, period_start)?;

    let mut model = payroll_data::ActiveModel {
        created_by: Set(Some(staff.id)),
        updated_by: Set(Some(staff.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        employee_id: Set(employee.id),
        salary_structure_id: Set(structure.id),
        month: Set(payload.month),
        year: Set(payload.year),
        remarks: Set(payload.remarks.clone()),
        ..Default::default()
    };
    apply_calculation(&mut model, &calculation, &payload.overrides)?;

    let data = PayrollData::insert(model)
        .exec_with_returning(db.get_ref()).await?;

    info!(
        payroll_data_id = %data.id,
        employee_id = %data.employee_id,
        net_pay = %data.net_pay,
        rate_table = %data.rate_table_version,
        "Calculated payroll data"
    );

    Ok(HttpResponse::Created().json(data))
}

#[get("")]
async fn list_payroll_data(db: web::Data<DatabaseConnection>, _staff: HrOrAdmin, query: web::Query<ListPayrollData>) -> Result<impl Responder, AppError> {
    let mut select = PayrollData::find()
        .order_by_desc(payroll_data::Column::Year)
        .order_by_desc(payroll_data::Column::Month)
        .order_by_asc(payroll_data::Column::CreatedAt);

    if let Some(employee_id) = query.employee_id {
        select = select.filter(payroll_data::Column::EmployeeId.eq(employee_id));
    }

    if let Some(month) = query.month {
        select = select.filter(payroll_data::Column::Month.eq(month));
    }

    if let Some(year) = query.year {
        select = select.filter(payroll_data::Column::Year.eq(year));
    }

    if let Some(status) = query.status {
        select = select.filter(payroll_data::Column::Status.eq(status));
    }

    let page = PageQuery { page: query.page, limit: query.limit }.resolve();

    let paginator = select.paginate(db.get_ref(), page.1);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.0).await?;

    Ok(web::Json(Page::new(items, total, page)))
}

#[get("/summary")]
async fn payroll_summary(db: web::Data<DatabaseConnection>, _staff: HrOrAdmin, query: web::Query<SummaryQuery>) -> Result<impl Responder, AppError> {
    ensure_valid(validation::validate_period(query.month, query.year))?;

    let rows = PayrollData::find()
        .filter(payroll_data::Column::Month.eq(query.month))
        .filter(payroll_data::Column::Year.eq(query.year))
        .find_also_related(Employee)
        .all(db.get_ref()).await?;

    let summary = summarize(rows.iter().map(|(data, employee)| SummaryRow {
        department: employee.as_ref().and_then(|employee| employee.department.as_deref()),
        status: data.status,
        gross_salary: data.gross_salary,
        total_deductions: data.total_deductions,
        net_pay: data.net_pay,
    }));

    Ok(web::Json(PayrollSummaryResponse {
        month: query.month,
        year: query.year,
        summary,
    }))
}

#[put("/{payroll_data_id}/recalculate")]
async fn recalculate_payroll_data(
    db: web::Data<DatabaseConnection>,
    rate_book: web::Data<RateBook>,
    staff: HrOrAdmin,
    data: RecalculablePayrollData,
    payload: web::Json<RecalculatePayrollData>,
) -> Result<impl Responder, AppError> {
    let payload = payload.into_inner();
    let (period_start, _) = period_bounds(data.month, data.year)?;

    let structure = require_structure(active_structure(db.get_ref(), data.employee_id).await?)?;

    let attendance = Attendance {
        total_working_days: payload.working_days.unwrap_or(data.working_days),
        present_days: payload.present_days.unwrap_or(data.present_days),
        // LOP follows the new attendance unless given explicitly.
        lop_days: match (payload.lop_days, payload.present_days.is_some() || payload.working_days.is_some()) {
            (Some(lop_days), _) => Some(lop_days),
            (None, true) => None,
            (None, false) => Some(data.lop_days),
        },
        overtime_hours: payload.overtime_hours.unwrap_or(data.overtime_hours),
    };

    let overrides = match payload.overrides {
        Some(overrides) => overrides,
        None => serde_json::from_value(data.overrides.clone())?,
    };

    let calculation = calculate_for_period(&rate_book, &SalaryComponents::from(&structure), &attendance, &overrides, period_start)?;

    let mut model = payroll_data::ActiveModel {
        id: Unchanged(data.id),
        updated_by: Set(Some(staff.id)),
        updated_at: Set(Local::now().fixed_offset()),
        salary_structure_id: Set(structure.id),
        ..Default::default()
    };
    if let Some(remarks) = payload.remarks {
        model.remarks = Set(Some(remarks));
    }
    apply_calculation(&mut model, &calculation, &overrides)?;

    let updated = PayrollData::update(model)
        .filter(payroll_data::Column::Status.eq(data.status))
        .exec(db.get_ref()).await?;

    info!(payroll_data_id = %updated.id, net_pay = %updated.net_pay, "Recalculated payroll data");

    Ok(web::Json(updated))
}

#[put("/{payroll_data_id}/approve")]
async fn approve_payroll_data(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, data: payroll_data::Model) -> Result<impl Responder, AppError> {
    let status = lifecycle::approve(data.status)?;
    let now = Local::now().fixed_offset();

    let updated = PayrollData::update(payroll_data::ActiveModel {
        id: Unchanged(data.id),
        status: Set(status),
        approved_by: Set(Some(staff.id)),
        approved_at: Set(Some(now)),
        updated_by: Set(Some(staff.id)),
        updated_at: Set(now),
        ..Default::default()
    })
        .filter(payroll_data::Column::Status.eq(data.status))
        .exec(db.get_ref()).await?;

    info!(payroll_data_id = %updated.id, approved_by = %staff.id, "Approved payroll data");

    Ok(web::Json(updated))
}

#[get("/{payroll_data_id}")]
async fn get_payroll_data(user: user::Model, data: payroll_data::Model) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(data.employee_id) {
        return Err(AppError::forbidden());
    }

    Ok(web::Json(data))
}

#[cfg(test)]
pub(crate) mod tests {
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::{json, Value};

    use crate::{
        auth::{tests::{bearer, user_with_role}, Authority},
        entity::sea_orm_active_enums::RoleType,
        pages::{employee::tests::employee_fixture, salary_structure::tests::structure_fixture, tests::transaction_log},
    };

    use super::*;

    /// Basic 15000 for October 2025, full attendance, ESIC and TDS opted out.
    pub(crate) fn payroll_data_fixture(employee_id: Uuid, status: PayrollStatus) -> payroll_data::Model {
        payroll_data::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            employee_id,
            salary_structure_id: Uuid::new_v4(),
            month: 10,
            year: 2025,
            working_days: 23,
            present_days: 23,
            absent_days: 0,
            lop_days: 0,
            overtime_hours: Decimal::ZERO,
            overrides: json!({ "earnings": [], "deductions": [] }),
            earnings: json!({ "basicSalary": "15000.00" }),
            deductions: json!({ "professionalTax": "0.00", "providentFund": "1800.00" }),
            employer_contributions: json!({ "provident_fund": "1800.00", "esic": "0.00" }),
            gross_salary: dec!(15000.00),
            total_deductions: dec!(1800.00),
            net_pay: dec!(13200.00),
            rate_table_version: "IN-2020.1".to_owned(),
            status,
            remarks: None,
            approved_by: None,
            approved_at: None,
        }
    }

    fn app_data(db: MockDatabase, secret: &[u8]) -> (web::Data<DatabaseConnection>, web::Data<Authority>, web::Data<RateBook>) {
        (
            web::Data::new(db.into_connection()),
            web::Data::new(Authority::new(secret)),
            web::Data::new(RateBook::default()),
        )
    }

    #[actix_web::test]
    async fn test_create_requires_active_structure() {
        let secret = b"secret";
        let employee = employee_fixture("EMP0001");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_data::Model>::new(),
            ])
            .append_query_results([
                Vec::<crate::entity::salary_structure::Model>::new(),
            ]);
        let (db, authority, rate_book) = app_data(db, secret);

        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(authority)
                .app_data(rate_book)
                .service(web::scope("/payroll-data").service(create_payroll_data))
        ).await;

        let req = test::TestRequest::post()
            .uri("/payroll-data")
            .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
            .set_json(json!({ "employee_id": employee.id, "month": 10, "year": 2025, "present_days": 23 }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "MissingConfigurationError");
        assert_eq!(body["message"], "Employee does not have a salary structure assigned");
    }

    #[actix_web::test]
    async fn test_create_rejects_duplicate_period() {
        let secret = b"secret";
        let employee = employee_fixture("EMP0001");
        let existing = payroll_data_fixture(employee.id, PayrollStatus::Calculated);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee.clone() ],
            ])
            .append_query_results([
                vec![ existing ],
            ]);
        let (db, authority, rate_book) = app_data(db, secret);

        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(authority)
                .app_data(rate_book)
                .service(web::scope("/payroll-data").service(create_payroll_data))
        ).await;

        let req = test::TestRequest::post()
            .uri("/payroll-data")
            .insert_header(bearer(secret, &user_with_role(RoleType::Admin)))
            .set_json(json!({ "employee_id": employee.id, "month": 10, "year": 2025, "present_days": 23 }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_create_stores_calculated_breakdown() {
        let secret = b"secret";
        let employee = employee_fixture("EMP0001");
        let structure = structure_fixture(employee.id, dec!(15000));
        let stored = payroll_data_fixture(employee.id, PayrollStatus::Calculated);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_data::Model>::new(),
            ])
            .append_query_results([
                vec![ structure ],
            ])
            .append_query_results([
                vec![ stored.clone() ],
            ]);
        let (db, authority, rate_book) = app_data(db, secret);

        let app = test::init_service(
            App::new()
                .app_data(db.clone())
                .app_data(authority)
                .app_data(rate_book)
                .service(web::scope("/payroll-data").service(create_payroll_data))
        ).await;

        let req = test::TestRequest::post()
            .uri("/payroll-data")
            .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
            .set_json(json!({ "employee_id": employee.id, "month": 10, "year": 2025, "present_days": 23 }))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // October 2025 has 23 weekdays; the insert carries the computed net pay.
        drop(app);
        let log = transaction_log(db);
        let insert = format!("{:?}", log.last().unwrap());
        assert!(insert.contains("INSERT INTO"));
        assert!(insert.contains("payroll_data"));
        assert!(insert.contains("13200"));
        assert!(insert.contains("IN-2020.1"));
    }

    #[actix_web::test]
    async fn test_approve_only_from_calculated() {
        let secret = b"secret";
        let employee_id = Uuid::new_v4();
        let draft = payroll_data_fixture(employee_id, PayrollStatus::Draft);
        let calculated = payroll_data_fixture(employee_id, PayrollStatus::Calculated);
        let mut approved = calculated.clone();
        approved.status = PayrollStatus::Approved;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ draft.clone() ],
                vec![ calculated.clone() ],
                vec![ approved.clone() ],
            ]);
        let (db, authority, _) = app_data(db, secret);

        let app = test::init_service(
            App::new()
                .app_data(db)
                .app_data(authority)
                .service(approve_payroll_data)
        ).await;

        let hr = user_with_role(RoleType::Hr);

        let req = test::TestRequest::put()
            .uri(&format!("/{}/approve", draft.id))
            .insert_header(bearer(secret, &hr))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "InvalidTransitionError");

        let req = test::TestRequest::put()
            .uri(&format!("/{}/approve", calculated.id))
            .insert_header(bearer(secret, &hr))
            .to_request();

        let returned: payroll_data::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.status, PayrollStatus::Approved);
    }
}
