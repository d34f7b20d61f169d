use std::str::FromStr;

use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::{sea_query::Expr, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::HrOrAdmin, consts::DEFAULT_CURRENCY, entity::{employee, prelude::*, salary_structure, sea_orm_active_enums::PayFrequency, user}, error::{ensure_valid, AppError}, payroll::SalaryComponents, validation};

use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_salary_structure)
        .service(get_active_structure)
        .service(get_structure_history)
        .service(get_salary_structure);
}

/// The structure payroll runs against, if the employee has one.
pub(super) async fn active_structure(db: &impl ConnectionTrait, employee_id: Uuid) -> Result<Option<salary_structure::Model>, DbErr> {
    SalaryStructure::find()
        .filter(salary_structure::Column::EmployeeId.eq(employee_id))
        .filter(salary_structure::Column::IsActive.eq(true))
        .one(db).await
}

#[post("")]
async fn create_salary_structure(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payload: web::Json<CreateSalaryStructure>) -> Result<impl Responder, AppError> {
    let currency = payload.currency.as_deref().map(str::trim).unwrap_or(DEFAULT_CURRENCY).to_uppercase();

    ensure_valid(validation::validate_salary_structure(&payload.components, &currency))?;

    Employee::find_by_id(payload.employee_id)
        .one(db.get_ref()).await?
        .ok_or_else(|| AppError::not_found("Employee"))?;

    let now = Local::now().fixed_offset();
    let components = &payload.components;

    let model = salary_structure::ActiveModel {
        created_by: Set(Some(staff.id)),
        updated_by: Set(Some(staff.id)),
        created_at: Set(now),
        updated_at: Set(now),
        employee_id: Set(payload.employee_id),
        basic_salary: Set(components.basic_salary),
        house_rent_allowance: Set(components.house_rent_allowance),
        conveyance_allowance: Set(components.conveyance_allowance),
        medical_allowance: Set(components.medical_allowance),
        special_allowance: Set(components.special_allowance),
        lta: Set(components.lta),
        shift_allowance: Set(components.shift_allowance),
        internet_allowance: Set(components.internet_allowance),
        arrears: Set(components.arrears),
        medical_premium: Set(components.medical_premium),
        nps: Set(components.nps),
        voluntary_pf: Set(components.voluntary_pf),
        skip_provident_fund: Set(components.skip_provident_fund),
        skip_esic: Set(components.skip_esic),
        skip_professional_tax: Set(components.skip_professional_tax),
        skip_tds: Set(components.skip_tds),
        currency: Set(currency),
        pay_frequency: Set(PayFrequency::Monthly),
        effective_from: Set(payload.effective_from.unwrap_or_else(|| now.date_naive())),
        is_active: Set(true),
        ..Default::default()
    };

    // Deactivate and insert together; the partial unique index rejects a
    // second active row if another request slips in between.
    let txn = db.begin().await?;

    let deactivated = SalaryStructure::update_many()
        .col_expr(salary_structure::Column::IsActive, Expr::value(false))
        .col_expr(salary_structure::Column::UpdatedAt, Expr::value(now))
        .col_expr(salary_structure::Column::UpdatedBy, Expr::value(staff.id))
        .filter(salary_structure::Column::EmployeeId.eq(payload.employee_id))
        .filter(salary_structure::Column::IsActive.eq(true))
        .exec(&txn).await?;

    let structure = SalaryStructure::insert(model)
        .exec_with_returning(&txn).await?;

    txn.commit().await?;

    info!(
        structure_id = %structure.id,
        employee_id = %structure.employee_id,
        deactivated = deactivated.rows_affected,
        "Activated salary structure"
    );

    Ok(HttpResponse::Created().json(structure))
}

#[get("/employee/{employee_id}/active")]
async fn get_active_structure(db: web::Data<DatabaseConnection>, user: user::Model, employee: employee::Model) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(employee.id) {
        return Err(AppError::forbidden());
    }

    let structure = active_structure(db.get_ref(), employee.id).await?
        .ok_or_else(|| AppError::not_found("Active salary structure"))?;

    Ok(web::Json(structure))
}

#[get("/employee/{employee_id}/history")]
async fn get_structure_history(db: web::Data<DatabaseConnection>, user: user::Model, employee: employee::Model) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(employee.id) {
        return Err(AppError::forbidden());
    }

    let history = SalaryStructure::find()
        .filter(salary_structure::Column::EmployeeId.eq(employee.id))
        .order_by_desc(salary_structure::Column::EffectiveFrom)
        .order_by_desc(salary_structure::Column::CreatedAt)
        .all(db.get_ref()).await?;

    Ok(web::Json(history))
}

#[get("/{structure_id}")]
async fn get_salary_structure(user: user::Model, structure: salary_structure::Model) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(structure.employee_id) {
        return Err(AppError::forbidden());
    }

    Ok(web::Json(structure))
}

#[cfg(test)]
pub(crate) mod tests {
    use actix_web::{http::StatusCode, test, App};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    use crate::{auth::{tests::{bearer, user_with_role}, Authority}, entity::sea_orm_active_enums::RoleType, pages::{employee::tests::employee_fixture, tests::transaction_log}};

    use super::*;

    pub(crate) fn structure_fixture(employee_id: Uuid, basic_salary: Decimal) -> salary_structure::Model {
        salary_structure::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            created_by: None,
            updated_by: None,
            employee_id,
            basic_salary,
            house_rent_allowance: Decimal::ZERO,
            conveyance_allowance: Decimal::ZERO,
            medical_allowance: Decimal::ZERO,
            special_allowance: Decimal::ZERO,
            lta: Decimal::ZERO,
            shift_allowance: Decimal::ZERO,
            internet_allowance: Decimal::ZERO,
            arrears: Decimal::ZERO,
            medical_premium: Decimal::ZERO,
            nps: Decimal::ZERO,
            voluntary_pf: Decimal::ZERO,
            skip_provident_fund: false,
            skip_esic: true,
            skip_professional_tax: false,
            skip_tds: true,
            currency: DEFAULT_CURRENCY.to_owned(),
            pay_frequency: PayFrequency::Monthly,
            effective_from: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            is_active: true,
        }
    }

    #[actix_web::test]
    async fn test_create_structure_switches_active_row_in_one_transaction() {
        let secret = b"secret";
        let employee = employee_fixture("EMP0001");
        let structure = structure_fixture(employee.id, dec!(15000));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ employee.clone() ],
            ])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
            ])
            .append_query_results([
                vec![ structure.clone() ],
            ])
            .into_connection();

        let db = web::Data::new(db);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(db.clone())
                .service(web::scope("/salary-structures").service(create_salary_structure))
        ).await;

        let req = test::TestRequest::post()
            .uri("/salary-structures")
            .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
            .set_json(json!({
                "employee_id": employee.id,
                "basic_salary": "15000",
                "skip_esic": true,
                "skip_tds": true,
            }))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        // The lookup runs alone; deactivation and insert share the transaction.
        drop(app);
        let log = transaction_log(db);
        assert_eq!(log.len(), 2);

        let txn = format!("{:?}", log.last().unwrap());
        let update = txn.find("UPDATE").unwrap();
        let insert = txn.find("INSERT").unwrap();
        assert!(update < insert);
    }

    #[actix_web::test]
    async fn test_create_structure_validation() {
        let secret = b"secret";

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()))
                .service(web::scope("/salary-structures").service(create_salary_structure))
        ).await;

        let req = test::TestRequest::post()
            .uri("/salary-structures")
            .insert_header(bearer(secret, &user_with_role(RoleType::Admin)))
            .set_json(json!({ "employee_id": Uuid::new_v4(), "basic_salary": "0", "nps": "-5" }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/salary-structures")
            .insert_header(bearer(secret, &user_with_role(RoleType::Employee)))
            .set_json(json!({ "employee_id": Uuid::new_v4(), "basic_salary": "15000" }))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
