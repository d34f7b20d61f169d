use std::str::FromStr;

use actix_web::{dev, get, post, put, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::HrOrAdmin, entity::{employee, prelude::*, sea_orm_active_enums::EmployeeStatus, user}, error::{ensure_valid, AppError}, pages::{non_blank, Page, PageQuery}, validation};

use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_employee)
        .service(list_employees)
        .service(get_employee)
        .service(update_employee);
}

fn optional(value: &Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_owned)
}

#[post("")]
async fn create_employee(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payload: web::Json<CreateEmployee>) -> Result<impl Responder, AppError> {
    ensure_valid(validation::validate_employee(&payload.fields()))?;

    let employee_code = payload.employee_code.trim().to_owned();
    let email = payload.email.trim().to_lowercase();

    let existing = Employee::find()
        .filter(Condition::any()
            .add(employee::Column::EmployeeCode.eq(&employee_code))
            .add(employee::Column::Email.eq(&email)))
        .one(db.get_ref()).await?;

    if let Some(existing) = existing {
        let field = if existing.employee_code == employee_code { "code" } else { "email" };
        return Err(AppError::DuplicateResource(format!("An employee with this {field} already exists")));
    }

    let model = employee::ActiveModel {
        created_by: Set(Some(staff.id)),
        updated_by: Set(Some(staff.id)),
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        employee_code: Set(employee_code),
        first_name: Set(payload.first_name.trim().to_owned()),
        last_name: Set(payload.last_name.trim().to_owned()),
        email: Set(email),
        department: Set(optional(&payload.department)),
        position: Set(optional(&payload.position)),
        hire_date: Set(payload.hire_date),
        status: Set(EmployeeStatus::Active),
        pan_number: Set(optional(&payload.pan_number)),
        aadhaar_number: Set(optional(&payload.aadhaar_number)),
        uan_number: Set(optional(&payload.uan_number)),
        pf_number: Set(optional(&payload.pf_number)),
        esi_number: Set(optional(&payload.esi_number)),
        bank_name: Set(optional(&payload.bank_name)),
        bank_account_number: Set(optional(&payload.bank_account_number)),
        ifsc_code: Set(optional(&payload.ifsc_code)),
        state: Set(optional(&payload.state)),
        pin_code: Set(optional(&payload.pin_code)),
        ..Default::default()
    };

    let employee = Employee::insert(model)
        .exec_with_returning(db.get_ref()).await?;

    info!(employee_id = %employee.id, code = %employee.employee_code, "Created employee");

    Ok(HttpResponse::Created().json(employee))
}

#[get("")]
async fn list_employees(db: web::Data<DatabaseConnection>, _staff: HrOrAdmin, query: web::Query<ListEmployees>) -> Result<impl Responder, AppError> {
    let mut select = Employee::find()
        .order_by_asc(employee::Column::EmployeeCode);

    if let Some(department) = non_blank(query.department.as_deref()) {
        select = select.filter(employee::Column::Department.eq(department));
    }

    if let Some(status) = query.status {
        select = select.filter(employee::Column::Status.eq(status));
    }

    if let Some(search) = non_blank(query.search.as_deref()) {
        let pattern = format!("%{search}%");

        select = select.filter(Condition::any()
            .add(employee::Column::EmployeeCode.like(&pattern))
            .add(employee::Column::FirstName.like(&pattern))
            .add(employee::Column::LastName.like(&pattern))
            .add(employee::Column::Email.like(&pattern)));
    }

    let page = PageQuery { page: query.page, limit: query.limit }.resolve();

    let paginator = select.paginate(db.get_ref(), page.1);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.0).await?;

    Ok(web::Json(Page::new(items, total, page)))
}

#[get("/{employee_id}")]
async fn get_employee(user: user::Model, employee: employee::Model) -> Result<impl Responder, AppError> {
    if !user.can_view_employee(employee.id) {
        return Err(AppError::forbidden());
    }

    Ok(web::Json(employee))
}

#[put("/{employee_id}")]
async fn update_employee(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, employee: employee::Model, payload: web::Json<UpdateEmployee>) -> Result<impl Responder, AppError> {
    ensure_valid(validation::validate_employee(&payload.fields()))?;

    let text = |value: &Option<String>| match value {
        Some(value) => Set(Some(value.trim().to_owned()).filter(|v| !v.is_empty())),
        None => Default::default(),
    };

    let required = |value: &Option<String>| match value {
        Some(value) => Set(value.trim().to_owned()),
        None => Default::default(),
    };

    let model = employee::ActiveModel {
        id: Unchanged(employee.id),
        updated_by: Set(Some(staff.id)),
        updated_at: Set(Local::now().fixed_offset()),
        first_name: required(&payload.first_name),
        last_name: required(&payload.last_name),
        email: match &payload.email {
            Some(email) => Set(email.trim().to_lowercase()),
            None => Default::default(),
        },
        status: match payload.status {
            Some(status) => Set(status),
            None => Default::default(),
        },
        department: text(&payload.department),
        position: text(&payload.position),
        pan_number: text(&payload.pan_number),
        aadhaar_number: text(&payload.aadhaar_number),
        uan_number: text(&payload.uan_number),
        pf_number: text(&payload.pf_number),
        esi_number: text(&payload.esi_number),
        bank_name: text(&payload.bank_name),
        bank_account_number: text(&payload.bank_account_number),
        ifsc_code: text(&payload.ifsc_code),
        state: text(&payload.state),
        pin_code: text(&payload.pin_code),
        ..Default::default()
    };

    let employee = Employee::update(model)
        .exec(db.get_ref()).await?;

    info!(employee_id = %employee.id, updated_by = %staff.id, "Updated employee");

    Ok(web::Json(employee))
}
