use std::str::FromStr;

use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use rust_decimal::Decimal;
use sea_orm::{sea_query::Expr, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{auth::HrOrAdmin, entity::{payslip_template, prelude::*, user}, error::{ensure_valid, AppError}, payroll::LineItems, validation::Violation};

pub(crate) use model::Line;
use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(create_template)
        .service(list_templates)
        .service(get_template);
}

pub(super) async fn default_template(db: &impl ConnectionTrait) -> Result<Option<payslip_template::Model>, DbErr> {
    PayslipTemplate::find()
        .filter(payslip_template::Column::IsDefault.eq(true))
        .filter(payslip_template::Column::IsActive.eq(true))
        .one(db).await
}

/// Line items in template order. Names the payslip does not carry are skipped.
pub(super) fn visible_lines(items: &LineItems, fields: &[String]) -> Vec<Line> {
    fields
        .iter()
        .filter_map(|name| items.get(name).map(|amount| Line { name: name.clone(), amount: *amount }))
        .collect()
}

/// Every line item, for payslips rendered without a template.
pub(super) fn all_lines(items: &LineItems) -> Vec<Line> {
    items.iter().map(|(name, amount)| Line { name: name.clone(), amount: *amount }).collect()
}

pub(super) fn template_fields(template: &payslip_template::Model) -> Result<(Vec<String>, Vec<String>), AppError> {
    Ok((
        serde_json::from_value(template.earnings_fields.clone())?,
        serde_json::from_value(template.deductions_fields.clone())?,
    ))
}

fn validate_template(payload: &CreateTemplate) -> Vec<Violation> {
    let mut violations = Vec::new();

    if payload.name.trim().is_empty() {
        violations.push(Violation::new("name", "name must not be empty"));
    }

    for (field, names) in [("earnings_fields", &payload.earnings_fields), ("deductions_fields", &payload.deductions_fields)] {
        if names.iter().any(|name| name.trim().is_empty()) {
            violations.push(Violation::new(field, format!("{field} must not contain empty names")));
        }
    }

    violations
}

#[post("")]
async fn create_template(db: web::Data<DatabaseConnection>, staff: HrOrAdmin, payload: web::Json<CreateTemplate>) -> Result<impl Responder, AppError> {
    ensure_valid(validate_template(&payload))?;

    let now = Local::now().fixed_offset();

    let model = payslip_template::ActiveModel {
        created_by: Set(Some(staff.id)),
        updated_by: Set(Some(staff.id)),
        created_at: Set(now),
        updated_at: Set(now),
        name: Set(payload.name.trim().to_owned()),
        earnings_fields: Set(serde_json::to_value(&payload.earnings_fields)?),
        deductions_fields: Set(serde_json::to_value(&payload.deductions_fields)?),
        is_default: Set(payload.is_default),
        is_active: Set(true),
        ..Default::default()
    };

    let txn = db.begin().await?;

    if payload.is_default {
        PayslipTemplate::update_many()
            .col_expr(payslip_template::Column::IsDefault, Expr::value(false))
            .col_expr(payslip_template::Column::UpdatedAt, Expr::value(now))
            .filter(payslip_template::Column::IsDefault.eq(true))
            .exec(&txn).await?;
    }

    let template = PayslipTemplate::insert(model)
        .exec_with_returning(&txn).await?;

    txn.commit().await?;

    info!(template_id = %template.id, name = %template.name, is_default = template.is_default, "Created payslip template");

    Ok(HttpResponse::Created().json(template))
}

#[get("")]
async fn list_templates(db: web::Data<DatabaseConnection>, _user: user::Model) -> Result<impl Responder, AppError> {
    let templates = PayslipTemplate::find()
        .filter(payslip_template::Column::IsActive.eq(true))
        .order_by_desc(payslip_template::Column::IsDefault)
        .order_by_asc(payslip_template::Column::Name)
        .all(db.get_ref()).await?;

    Ok(web::Json(templates))
}

#[get("/{template_id}")]
async fn get_template(_user: user::Model, template: payslip_template::Model) -> impl Responder {
    web::Json(template)
}

impl FromRequest for payslip_template::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let template_id = req.match_info().get("template_id").expect("This extractor must be used under `template_id` path");
            let Ok(template_id) = Uuid::from_str(template_id) else {
                return Err(AppError::InvalidInput("invalid `template_id`".to_owned()).into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let template = PayslipTemplate::find_by_id(template_id)
                .one(db.as_ref()).await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::not_found("Payslip template"))?;

            Ok(template)
        })
    }
}
