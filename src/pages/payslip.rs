use std::str::FromStr;

use actix_web::{dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Datelike as _, FixedOffset, Local, NaiveDate};
use futures_util::future::LocalBoxFuture;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::{Admin, HrOrAdmin},
    consts::{DEFAULT_CURRENCY, DEFAULT_PAYMENT_MODE, MIN_EDIT_REASON_LEN},
    entity::{employee, payroll_data, payslip, prelude::*, sea_orm_active_enums::{PayslipStatus, RoleType}, user},
    error::{ensure_valid, AppError},
    pages::{
        non_blank,
        payroll_data::{calculate_for_period, period_bounds},
        payslip_template::{all_lines, default_template, template_fields, visible_lines, Line},
        salary_structure::active_structure,
        Page, PageQuery,
    },
    payroll::{calculation::AttendanceSummary, lifecycle::{self, Transition}, require_structure, round_amount, words::amount_in_words, Attendance, LineItems, Overrides, RateBook, SalaryComponents},
    utils, validation::{self, Violation},
};

use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(calculate_preview)
        .service(generate)
        .service(bulk_generate)
        .service(list_payslips)
        .service(my_payslips)
        .service(view_payslip)
        .service(finalize_payslip)
        .service(mark_payslip_paid)
        .service(cancel_payslip)
        .service(unlock_payslip)
        .service(get_payslip)
        .service(update_payslip);
}

/// Builds a draft payslip from one approved payroll data row.
async fn generate_payslip(db: &impl ConnectionTrait, request: &GeneratePayslip, generated_by: Uuid) -> Result<payslip::Model, AppError> {
    let data = PayrollData::find_by_id(request.payroll_data_id)
        .one(db).await?
        .ok_or_else(|| AppError::not_found("Payroll data"))?;

    lifecycle::ensure_approved(data.status)?;

    let existing = Payslip::find()
        .filter(payslip::Column::EmployeeId.eq(data.employee_id))
        .filter(payslip::Column::Month.eq(data.month))
        .filter(payslip::Column::Year.eq(data.year))
        .one(db).await?;

    if existing.is_some() {
        return Err(AppError::DuplicateResource("Payslip already exists for this employee and period".to_owned()));
    }

    let employee = Employee::find_by_id(data.employee_id)
        .one(db).await?
        .ok_or_else(|| AppError::not_found("Employee"))?;

    let template = match request.template_id {
        Some(template_id) => Some(PayslipTemplate::find_by_id(template_id)
            .one(db).await?
            .ok_or_else(|| AppError::not_found("Payslip template"))?),
        None => default_template(db).await?,
    };

    let (period_start, period_end) = period_bounds(data.month, data.year)?;
    let pay_period = utils::pay_period_label(period_start.year(), period_start.month())
        .ok_or_else(|| AppError::InvalidInput(format!("{}-{} is not a valid pay period", data.year, data.month)))?;

    let attendance = AttendanceSummary {
        total_working_days: data.working_days,
        present_days: data.present_days,
        absent_days: data.absent_days,
        lop_days: data.lop_days,
        paid_days: data.present_days,
        overtime_hours: data.overtime_hours,
    };

    let now = Local::now().fixed_offset();

    let model = payslip::ActiveModel {
        created_at: Set(now),
        updated_at: Set(now),
        employee_id: Set(employee.id),
        payroll_data_id: Set(data.id),
        template_id: Set(template.as_ref().map(|template| template.id)),
        month: Set(data.month),
        year: Set(data.year),
        pay_period: Set(pay_period),
        pay_period_start: Set(period_start),
        pay_period_end: Set(period_end),
        payslip_number: Set(utils::payslip_number(period_start.year(), period_start.month(), &employee.employee_code)),
        employee_info: Set(serde_json::to_value(EmployeeInfo::from(&employee))?),
        earnings: Set(data.earnings.clone()),
        deductions: Set(data.deductions.clone()),
        attendance: Set(serde_json::to_value(&attendance)?),
        gross_salary: Set(data.gross_salary),
        total_deductions: Set(data.total_deductions),
        net_pay: Set(data.net_pay),
        net_pay_in_words: Set(amount_in_words(data.net_pay)),
        payment_mode: Set(non_blank(request.payment_mode.as_deref()).unwrap_or(DEFAULT_PAYMENT_MODE).to_owned()),
        rate_table_version: Set(data.rate_table_version.clone()),
        status: Set(PayslipStatus::Draft),
        is_locked: Set(false),
        version: Set(1),
        manually_edited: Set(false),
        generated_by: Set(Some(generated_by)),
        generated_at: Set(now),
        ..Default::default()
    };

    let payslip = Payslip::insert(model)
        .exec_with_returning(db).await?;

    info!(
        payslip_id = %payslip.id,
        payslip_number = %payslip.payslip_number,
        payroll_data_id = %data.id,
        "Generated payslip"
    );

    Ok(payslip)
}

/// Status change shared by the lifecycle endpoints.
fn transitioned(payslip: &payslip::Model, transition: Transition, at: DateTime<FixedOffset>) -> payslip::ActiveModel {
    payslip::ActiveModel {
        id: Unchanged(payslip.id),
        status: Set(transition.status),
        is_locked: Set(transition.is_locked),
        updated_at: Set(at),
        ..Default::default()
    }
}

#[post("/calculate")]
async fn calculate_preview(
    db: web::Data<DatabaseConnection>,
    rate_book: web::Data<RateBook>,
    _staff: HrOrAdmin,
    payload: web::Json<CalculatePayslip>,
) -> Result<impl Responder, AppError> {
    let components = match (&payload.structure, payload.employee_id) {
        (Some(structure), _) => {
            ensure_valid(validation::validate_salary_structure(structure, DEFAULT_CURRENCY))?;
            structure.clone()
        }
        (None, Some(employee_id)) => SalaryComponents::from(&require_structure(active_structure(db.get_ref(), employee_id).await?)?),
        (None, None) => require_structure(None::<SalaryComponents>)?,
    };

    let period_start = match (payload.month, payload.year) {
        (Some(month), Some(year)) => period_bounds(month, year)?.0,
        (None, None) => Local::now().date_naive(),
        _ => return Err(AppError::InvalidInput("month and year must be given together".to_owned())),
    };

    let calculation = calculate_for_period(&rate_book, &components, &payload.attendance, &payload.overrides, period_start)?;

    Ok(web::Json(calculation))
}

#[post("/generate")]
async fn generate(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payload: web::Json<GeneratePayslip>) -> Result<impl Responder, AppError> {
    let payslip = generate_payslip(db.get_ref(), &payload, staff.id).await
        .inspect_err(|err| warn!(payroll_data_id = %payload.payroll_data_id, "Payslip generation rejected: {err}"))?;

    Ok(HttpResponse::Created().json(payslip))
}

#[post("/bulk-generate")]
async fn bulk_generate(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payload: web::Json<BulkGeneratePayslips>) -> Result<impl Responder, AppError> {
    if payload.payroll_data_ids.is_empty() {
        return Err(AppError::InvalidInput("payroll_data_ids must not be empty".to_owned()));
    }

    let mut results = Vec::with_capacity(payload.payroll_data_ids.len());

    // Each row stands alone; one failure does not undo the others.
    for &payroll_data_id in &payload.payroll_data_ids {
        let request = GeneratePayslip {
            payroll_data_id,
            template_id: payload.template_id,
            payment_mode: payload.payment_mode.clone(),
        };

        let outcome = match generate_payslip(db.get_ref(), &request, staff.id).await {
            Ok(payslip) => BulkOutcome::Generated { payroll_data_id, payslip: Box::new(payslip) },
            Err(err) => {
                warn!(%payroll_data_id, "Bulk payslip generation failed: {err}");
                BulkOutcome::Failed { payroll_data_id, message: err.to_string() }
            }
        };

        results.push(outcome);
    }

    let generated = results.iter().filter(|outcome| matches!(outcome, BulkOutcome::Generated { .. })).count();
    let failed = results.len() - generated;

    info!(generated, failed, "Bulk payslip generation finished");

    Ok(web::Json(BulkGenerateResponse { generated, failed, results }))
}

#[get("")]
async fn list_payslips(db: web::Data<DatabaseConnection>, _staff: HrOrAdmin, query: web::Query<ListPayslips>) -> Result<impl Responder, AppError> {
    let mut select = Payslip::find()
        .order_by_desc(payslip::Column::Year)
        .order_by_desc(payslip::Column::Month)
        .order_by_asc(payslip::Column::PayslipNumber);

    if let Some(employee_id) = query.employee_id {
        select = select.filter(payslip::Column::EmployeeId.eq(employee_id));
    }

    if let Some(month) = query.month {
        select = select.filter(payslip::Column::Month.eq(month));
    }

    if let Some(year) = query.year {
        select = select.filter(payslip::Column::Year.eq(year));
    }

    if let Some(status) = query.status {
        select = select.filter(payslip::Column::Status.eq(status));
    }

    let page = PageQuery { page: query.page, limit: query.limit }.resolve();

    let paginator = select.paginate(db.get_ref(), page.1);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.0).await?;

    Ok(web::Json(Page::new(items, total, page)))
}

#[get("/my")]
async fn my_payslips(db: web::Data<DatabaseConnection>, user: user::Model) -> Result<impl Responder, AppError> {
    let Some(employee_id) = user.employee_id else {
        return Err(AppError::Forbidden("User is not linked to an employee".to_owned()));
    };

    let payslips = Payslip::find()
        .filter(payslip::Column::EmployeeId.eq(employee_id))
        .order_by_desc(payslip::Column::Year)
        .order_by_desc(payslip::Column::Month)
        .all(db.get_ref()).await?;

    Ok(web::Json(payslips))
}

#[get("/{payslip_id}")]
async fn get_payslip(user: user::Model, payslip: payslip::Model) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(payslip.employee_id) {
        return Err(AppError::forbidden());
    }

    Ok(web::Json(payslip))
}

#[get("/{payslip_id}/view")]
async fn view_payslip(db: web::Data<DatabaseConnection>, user: user::Model, payslip: payslip::Model, query: web::Query<ViewQuery>) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(payslip.employee_id) {
        return Err(AppError::forbidden());
    }

    let template = match query.template_id.or(payslip.template_id) {
        Some(template_id) => Some(PayslipTemplate::find_by_id(template_id)
            .one(db.get_ref()).await?
            .ok_or_else(|| AppError::not_found("Payslip template"))?),
        None => default_template(db.get_ref()).await?,
    };

    let earnings: LineItems = serde_json::from_value(payslip.earnings.clone())?;
    let deductions: LineItems = serde_json::from_value(payslip.deductions.clone())?;

    let (earnings, deductions) = match &template {
        Some(template) => {
            let (earnings_fields, deductions_fields) = template_fields(template)?;
            (visible_lines(&earnings, &earnings_fields), visible_lines(&deductions, &deductions_fields))
        }
        None => (all_lines(&earnings), all_lines(&deductions)),
    };

    Ok(web::Json(PayslipView {
        template_id: template.map(|template| template.id),
        payslip,
        earnings,
        deductions,
    }))
}

#[put("/{payslip_id}")]
async fn update_payslip(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payslip: payslip::Model, payload: web::Json<UpdatePayslip>) -> Result<impl Responder, AppError> {
    if payload.force && staff.role != RoleType::Admin {
        warn!(payslip_id = %payslip.id, user_id = %staff.id, "Rejected forced payslip edit");
        return Err(AppError::Forbidden("Only admins can force an edit of a locked payslip".to_owned()));
    }

    lifecycle::ensure_editable(payslip.status, payslip.is_locked, payload.force)?;

    let earnings: LineItems = match &payload.earnings {
        Some(items) => items.clone(),
        None => serde_json::from_value(payslip.earnings.clone())?,
    };
    let deductions: LineItems = match &payload.deductions {
        Some(items) => items.clone(),
        None => serde_json::from_value(payslip.deductions.clone())?,
    };

    let mut violations = Vec::new();

    if payload.reason.trim().chars().count() < MIN_EDIT_REASON_LEN {
        violations.push(Violation::new("reason", format!("reason must be at least {MIN_EDIT_REASON_LEN} characters")));
    }

    for (side, items) in [("earnings", &earnings), ("deductions", &deductions)] {
        for (name, amount) in items {
            if amount.is_sign_negative() && !amount.is_zero() {
                violations.push(Violation::new(side, format!("{name} must not be negative")));
            }
        }
    }

    ensure_valid(violations)?;

    let round = |items: LineItems| -> LineItems { items.into_iter().map(|(name, amount)| (name, round_amount(amount))).collect() };
    let (earnings, deductions) = (round(earnings), round(deductions));

    let gross_salary: Decimal = earnings.values().copied().sum();
    let total_deductions: Decimal = deductions.values().copied().sum();
    let net_pay = gross_salary - total_deductions;

    if net_pay.is_sign_negative() && !net_pay.is_zero() {
        return Err(AppError::InvalidInput("Net pay cannot be negative".to_owned()));
    }

    let now = Local::now().fixed_offset();

    let mut model = payslip::ActiveModel {
        id: Unchanged(payslip.id),
        updated_at: Set(now),
        earnings: Set(serde_json::to_value(&earnings)?),
        deductions: Set(serde_json::to_value(&deductions)?),
        gross_salary: Set(gross_salary),
        total_deductions: Set(total_deductions),
        net_pay: Set(net_pay),
        net_pay_in_words: Set(amount_in_words(net_pay)),
        version: Set(payslip.version + 1),
        manually_edited: Set(true),
        last_edited_by: Set(Some(staff.id)),
        last_edited_at: Set(Some(now)),
        ..Default::default()
    };
    if let Some(payment_mode) = non_blank(payload.payment_mode.as_deref()) {
        model.payment_mode = Set(payment_mode.to_owned());
    }

    // Lifecycle changes leave `version` alone, so the status and lock are pinned too.
    let updated = Payslip::update(model)
        .filter(payslip::Column::Version.eq(payslip.version))
        .filter(payslip::Column::Status.eq(payslip.status))
        .filter(payslip::Column::IsLocked.eq(payslip.is_locked))
        .exec(db.get_ref()).await?;

    if payload.force {
        warn!(payslip_id = %updated.id, admin_id = %staff.id, reason = %payload.reason.trim(), "Force-edited locked payslip");
    }

    info!(
        payslip_id = %updated.id,
        version = updated.version,
        edited_by = %staff.id,
        reason = %payload.reason.trim(),
        "Edited payslip"
    );

    Ok(web::Json(updated))
}

#[put("/{payslip_id}/finalize")]
async fn finalize_payslip(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payslip: payslip::Model) -> Result<impl Responder, AppError> {
    let transition = lifecycle::finalize(payslip.status)?;
    let now = Local::now().fixed_offset();

    let mut model = transitioned(&payslip, transition, now);
    model.finalized_by = Set(Some(staff.id));
    model.finalized_at = Set(Some(now));

    let updated = Payslip::update(model)
        .filter(payslip::Column::Status.eq(payslip.status))
        .exec(db.get_ref()).await?;

    info!(payslip_id = %updated.id, finalized_by = %staff.id, "Finalized payslip");

    Ok(web::Json(updated))
}

#[put("/{payslip_id}/mark-paid")]
async fn mark_payslip_paid(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payslip: payslip::Model, payload: web::Json<MarkPaid>) -> Result<impl Responder, AppError> {
    let transition = lifecycle::mark_paid(payslip.status)?;
    let now = Local::now().fixed_offset();

    let mut model = transitioned(&payslip, transition, now);
    model.paid_by = Set(Some(staff.id));
    model.paid_at = Set(Some(now));
    model.payment_method = Set(non_blank(payload.payment_method.as_deref()).map(str::to_owned));
    model.payment_reference = Set(non_blank(payload.payment_reference.as_deref()).map(str::to_owned));

    // The payslip and its payroll data are settled together or not at all.
    let txn = db.begin().await?;

    let paid = Payslip::update(model)
        .filter(payslip::Column::Status.eq(payslip.status))
        .exec(&txn).await?;

    let data = PayrollData::find_by_id(payslip.payroll_data_id)
        .one(&txn).await?
        .ok_or_else(|| AppError::not_found("Payroll data"))?;

    let settled = lifecycle::settle(data.status)?;

    PayrollData::update(payroll_data::ActiveModel {
        id: Unchanged(data.id),
        status: Set(settled),
        updated_by: Set(Some(staff.id)),
        updated_at: Set(now),
        ..Default::default()
    })
        .filter(payroll_data::Column::Status.eq(data.status))
        .exec(&txn).await?;

    txn.commit().await?;

    info!(payslip_id = %paid.id, payroll_data_id = %data.id, paid_by = %staff.id, "Marked payslip as paid");

    Ok(web::Json(paid))
}

#[put("/{payslip_id}/cancel")]
async fn cancel_payslip(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payslip: payslip::Model) -> Result<impl Responder, AppError> {
    let transition = lifecycle::cancel(payslip.status)?;

    let updated = Payslip::update(transitioned(&payslip, transition, Local::now().fixed_offset()))
        .filter(payslip::Column::Status.eq(payslip.status))
        .exec(db.get_ref()).await?;

    info!(payslip_id = %updated.id, cancelled_by = %staff.id, "Cancelled payslip");

    Ok(web::Json(updated))
}

#[put("/{payslip_id}/unlock")]
async fn unlock_payslip(db: web::Data<DatabaseConnection>, admin: Admin, payslip: payslip::Model) -> Result<impl Responder, AppError> {
    let transition = lifecycle::unlock(payslip.status)?;

    let updated = Payslip::update(transitioned(&payslip, transition, Local::now().fixed_offset()))
        .filter(payslip::Column::Status.eq(payslip.status))
        .exec(db.get_ref()).await?;

    warn!(payslip_id = %updated.id, admin_id = %admin.id, "Unlocked finalized payslip");

    Ok(web::Json(updated))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::{json, Value};

    use crate::{
        auth::{tests::{bearer, user_with_role}, Authority},
        entity::{payslip_template, sea_orm_active_enums::PayrollStatus},
        pages::{employee::tests::employee_fixture, payroll_data::tests::payroll_data_fixture, tests::transaction_log},
    };

    use super::*;

    fn payslip_fixture(employee_id: Uuid, status: PayslipStatus) -> payslip::Model {
        let is_locked = status != PayslipStatus::Draft;

        payslip::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id,
            payroll_data_id: Uuid::new_v4(),
            template_id: None,
            month: 10,
            year: 2025,
            pay_period: "October 2025".to_owned(),
            pay_period_start: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            pay_period_end: NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
            payslip_number: "PS202510EMP0001".to_owned(),
            employee_info: json!({ "employee_code": "EMP0001" }),
            earnings: json!({ "basicSalary": "15000.00" }),
            deductions: json!({ "professionalTax": "0.00", "providentFund": "1800.00" }),
            attendance: json!({ "total_working_days": 23, "present_days": 23 }),
            gross_salary: dec!(15000.00),
            total_deductions: dec!(1800.00),
            net_pay: dec!(13200.00),
            net_pay_in_words: amount_in_words(dec!(13200.00)),
            payment_mode: DEFAULT_PAYMENT_MODE.to_owned(),
            rate_table_version: "IN-2020.1".to_owned(),
            status,
            is_locked,
            version: 1,
            manually_edited: false,
            generated_by: None,
            generated_at: Local::now().into(),
            last_edited_by: None,
            last_edited_at: None,
            finalized_by: None,
            finalized_at: None,
            paid_by: None,
            paid_at: None,
            payment_method: None,
            payment_reference: None,
        }
    }

    fn decimal_at(body: &Value, field: &str) -> Decimal {
        Decimal::from_str(body[field].as_str().unwrap()).unwrap()
    }

    #[actix_web::test]
    async fn test_calculate_preview() {
        let secret = b"secret";

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()))
                .app_data(web::Data::new(RateBook::default()))
                .service(web::scope("/payslips").service(calculate_preview))
        ).await;

        let preview = |skip_esic: bool| test::TestRequest::post()
            .uri("/payslips/calculate")
            .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
            .set_json(json!({
                "structure": { "basic_salary": "15000", "skip_esic": skip_esic, "skip_tds": true },
                "attendance": { "total_working_days": 21, "present_days": 21 },
                "month": 10,
                "year": 2025,
            }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, preview(true)).await;
        assert_eq!(decimal_at(&body, "gross_salary"), dec!(15000));
        assert_eq!(decimal_at(&body, "net_pay"), dec!(13200));
        assert_eq!(Decimal::from_str(body["deductions"]["providentFund"].as_str().unwrap()).unwrap(), dec!(1800));

        let body: Value = test::call_and_read_body_json(&app, preview(false)).await;
        assert_eq!(Decimal::from_str(body["deductions"]["esic"].as_str().unwrap()).unwrap(), dec!(112.50));
        assert_eq!(decimal_at(&body, "net_pay"), dec!(13087.50));
    }

    #[actix_web::test]
    async fn test_calculate_without_structure() {
        let secret = b"secret";

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()))
                .app_data(web::Data::new(RateBook::default()))
                .service(calculate_preview)
        ).await;

        let req = test::TestRequest::post()
            .uri("/calculate")
            .insert_header(bearer(secret, &user_with_role(RoleType::Admin)))
            .set_json(json!({ "attendance": { "total_working_days": 21, "present_days": 21 } }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "MissingConfigurationError");
    }

    #[actix_web::test]
    async fn test_generate_snapshots_approved_payroll() {
        let secret = b"secret";
        let employee = employee_fixture("EMP0001");
        let data = payroll_data_fixture(employee.id, PayrollStatus::Approved);
        let generated = payslip_fixture(employee.id, PayslipStatus::Draft);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ data.clone() ],
            ])
            .append_query_results([
                Vec::<payslip::Model>::new(),
            ])
            .append_query_results([
                vec![ employee.clone() ],
            ])
            .append_query_results([
                Vec::<payslip_template::Model>::new(),
            ])
            .append_query_results([
                vec![ generated.clone() ],
            ])
            .into_connection();
        let db = web::Data::new(db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(db.clone())
                .service(web::scope("/payslips").service(generate))
        ).await;

        let req = test::TestRequest::post()
            .uri("/payslips/generate")
            .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
            .set_json(json!({ "payroll_data_id": data.id }))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        drop(app);
        let log = transaction_log(db);
        let insert = format!("{:?}", log.last().unwrap());
        assert!(insert.contains("INSERT INTO"));
        assert!(insert.contains("PS202510EMP0001"));
        assert!(insert.contains("October 2025"));
        assert!(insert.contains(DEFAULT_PAYMENT_MODE));
    }

    #[actix_web::test]
    async fn test_generate_rejects_duplicate_and_unapproved() {
        let secret = b"secret";
        let employee_id = Uuid::new_v4();
        let approved = payroll_data_fixture(employee_id, PayrollStatus::Approved);
        let calculated = payroll_data_fixture(employee_id, PayrollStatus::Calculated);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ approved.clone() ],
            ])
            .append_query_results([
                vec![ payslip_fixture(employee_id, PayslipStatus::Draft) ],
            ])
            .append_query_results([
                vec![ calculated.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(generate)
        ).await;

        let hr = user_with_role(RoleType::Hr);

        let req = test::TestRequest::post()
            .uri("/generate")
            .insert_header(bearer(secret, &hr))
            .set_json(json!({ "payroll_data_id": approved.id }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "DuplicateResourceError");
        assert_eq!(body["message"], "Payslip already exists for this employee and period");

        let req = test::TestRequest::post()
            .uri("/generate")
            .insert_header(bearer(secret, &hr))
            .set_json(json!({ "payroll_data_id": calculated.id }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "InvalidTransitionError");
    }

    #[actix_web::test]
    async fn test_bulk_generate_reports_each_row() {
        let secret = b"secret";
        let employee = employee_fixture("EMP0001");
        let data = payroll_data_fixture(employee.id, PayrollStatus::Approved);
        let missing_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ data.clone() ],
            ])
            .append_query_results([
                Vec::<payslip::Model>::new(),
            ])
            .append_query_results([
                vec![ employee.clone() ],
            ])
            .append_query_results([
                Vec::<payslip_template::Model>::new(),
            ])
            .append_query_results([
                vec![ payslip_fixture(employee.id, PayslipStatus::Draft) ],
            ])
            .append_query_results([
                Vec::<payroll_data::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(bulk_generate)
        ).await;

        let hr = user_with_role(RoleType::Hr);

        let req = test::TestRequest::post()
            .uri("/bulk-generate")
            .insert_header(bearer(secret, &hr))
            .set_json(json!({ "payroll_data_ids": [] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/bulk-generate")
            .insert_header(bearer(secret, &hr))
            .set_json(json!({ "payroll_data_ids": [data.id, missing_id] }))
            .to_request();

        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["generated"], 1);
        assert_eq!(body["failed"], 1);
        assert_eq!(body["results"][0]["status"], "generated");
        assert_eq!(body["results"][1]["status"], "failed");
        assert_eq!(body["results"][1]["payroll_data_id"], json!(missing_id));
        assert_eq!(body["results"][1]["message"], "Payroll data not found");
    }

    #[actix_web::test]
    async fn test_edit_locked_payslip() {
        let secret = b"secret";
        let locked = payslip_fixture(Uuid::new_v4(), PayslipStatus::Finalized);
        let mut edited = locked.clone();
        edited.version = 2;
        edited.manually_edited = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ locked.clone() ],
                vec![ locked.clone() ],
                vec![ locked.clone() ],
                vec![ locked.clone() ],
                vec![ edited.clone() ],
            ])
            .into_connection();
        let db = web::Data::new(db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(db.clone())
                .service(update_payslip)
        ).await;

        let uri = format!("/{}", locked.id);
        let hr = user_with_role(RoleType::Hr);
        let admin = user_with_role(RoleType::Admin);

        let edit = |user: &user::Model, force: bool, reason: &str| test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(secret, user))
            .set_json(json!({
                "earnings": { "basicSalary": "16000" },
                "reason": reason,
                "force": force,
            }))
            .to_request();

        let response = test::call_service(&app, edit(&hr, false, "Corrected basic salary")).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "LockedResourceError");
        assert_eq!(body["message"], "Cannot modify locked payslip");

        assert_eq!(test::call_service(&app, edit(&hr, true, "Corrected basic salary")).await.status(), StatusCode::FORBIDDEN);

        let response = test::call_service(&app, edit(&admin, true, "typo")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["violations"][0]["field"], "reason");

        let returned: payslip::Model = test::call_and_read_body_json(&app, edit(&admin, true, "Corrected basic salary")).await;
        assert_eq!(returned.version, 2);

        // Totals are recomputed from the submitted lines.
        drop(app);
        let log = transaction_log(db);
        let update = format!("{:?}", log.last().unwrap());
        assert!(update.contains("UPDATE"));
        assert!(update.contains("14200"));
        assert!(update.contains("Fourteen Thousand Two Hundred Rupees Only"));

        // A concurrent finalize or unlock must not be overwritten by the edit.
        let start = update.find("WHERE").unwrap();
        let end = update.find("RETURNING").unwrap_or(update.len());
        let guard = &update[start..end];
        assert!(guard.contains("version"));
        assert!(guard.contains("status"));
        assert!(guard.contains("is_locked"));
    }

    #[actix_web::test]
    async fn test_edit_rejects_negative_net_pay() {
        let secret = b"secret";
        let draft = payslip_fixture(Uuid::new_v4(), PayslipStatus::Draft);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ draft.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(update_payslip)
        ).await;

        let req = test::TestRequest::put()
            .uri(&format!("/{}", draft.id))
            .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
            .set_json(json!({
                "deductions": { "providentFund": "20000" },
                "reason": "Recovered salary advance",
            }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "InvalidInputError");
    }

    #[actix_web::test]
    async fn test_finalize_transitions() {
        let secret = b"secret";
        let employee_id = Uuid::new_v4();
        let paid = payslip_fixture(employee_id, PayslipStatus::Paid);
        let draft = payslip_fixture(employee_id, PayslipStatus::Draft);
        let finalized = payslip_fixture(employee_id, PayslipStatus::Finalized);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ paid.clone() ],
                vec![ draft.clone() ],
                vec![ finalized.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(finalize_payslip)
        ).await;

        let hr = user_with_role(RoleType::Hr);

        let req = test::TestRequest::put()
            .uri(&format!("/{}/finalize", paid.id))
            .insert_header(bearer(secret, &hr))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body["error"], "InvalidTransitionError");

        let req = test::TestRequest::put()
            .uri(&format!("/{}/finalize", draft.id))
            .insert_header(bearer(secret, &hr))
            .to_request();

        let returned: payslip::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.status, PayslipStatus::Finalized);
        assert!(returned.is_locked);
    }

    #[actix_web::test]
    async fn test_mark_paid_settles_payroll_in_one_transaction() {
        let secret = b"secret";
        let employee_id = Uuid::new_v4();
        let finalized = payslip_fixture(employee_id, PayslipStatus::Finalized);
        let mut paid = finalized.clone();
        paid.status = PayslipStatus::Paid;

        let mut data = payroll_data_fixture(employee_id, PayrollStatus::Approved);
        data.id = finalized.payroll_data_id;
        let mut settled = data.clone();
        settled.status = PayrollStatus::Paid;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ finalized.clone() ],
                vec![ paid.clone() ],
            ])
            .append_query_results([
                vec![ data.clone() ],
                vec![ settled.clone() ],
            ])
            .into_connection();
        let db = web::Data::new(db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(db.clone())
                .service(mark_payslip_paid)
        ).await;

        let req = test::TestRequest::put()
            .uri(&format!("/{}/mark-paid", finalized.id))
            .insert_header(bearer(secret, &user_with_role(RoleType::Admin)))
            .set_json(json!({ "payment_method": "NEFT", "payment_reference": "UTR123456" }))
            .to_request();

        let returned: payslip::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.status, PayslipStatus::Paid);

        drop(app);
        let log = transaction_log(db);
        assert_eq!(log.len(), 2);

        // Both updates and the payroll lookup share the transaction.
        let txn = format!("{:?}", log.last().unwrap());
        assert_eq!(txn.matches("UPDATE").count(), 2);
        assert!(txn.contains("SELECT"));
        assert!(txn.contains("UTR123456"));
    }

    #[actix_web::test]
    async fn test_unlock_is_admin_only() {
        let secret = b"secret";
        let finalized = payslip_fixture(Uuid::new_v4(), PayslipStatus::Finalized);
        let mut unlocked = finalized.clone();
        unlocked.status = PayslipStatus::Draft;
        unlocked.is_locked = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ finalized.clone() ],
                vec![ unlocked.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(unlock_payslip)
        ).await;

        let uri = format!("/{}/unlock", finalized.id);

        let req = test::TestRequest::put().uri(&uri).insert_header(bearer(secret, &user_with_role(RoleType::Hr))).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::put().uri(&uri).insert_header(bearer(secret, &user_with_role(RoleType::Admin))).to_request();
        let returned: payslip::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned.status, PayslipStatus::Draft);
        assert!(!returned.is_locked);
    }
}
