use std::ops::Deref;

use super::*;

impl FromRequest for payroll_data::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payroll_data_id = req.match_info().get("payroll_data_id").expect("This extractor must be used under `payroll_data_id` path");
            let Ok(payroll_data_id) = Uuid::from_str(payroll_data_id) else {
                return Err(AppError::InvalidInput("invalid `payroll_data_id`".to_owned()).into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let data = PayrollData::find_by_id(payroll_data_id)
                .one(db.as_ref()).await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::not_found("Payroll data"))?;

            Ok(data)
        })
    }
}

/// Payroll data still open for recalculation (draft or calculated).
pub(super) struct RecalculablePayrollData(pub(super) payroll_data::Model);

impl Deref for RecalculablePayrollData {
    type Target = payroll_data::Model;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for RecalculablePayrollData {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let data = payroll_data::Model::from_request(&req, &mut dev::Payload::None).await?;

            lifecycle::ensure_recalculable(data.status).map_err(AppError::from)?;

            Ok(Self(data))
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{get, http::StatusCode, test, App, Responder};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::entity::sea_orm_active_enums::PayrollStatus;

    use super::{super::tests::payroll_data_fixture, *};

    #[actix_web::test]
    async fn test_recalculable_payroll_data_extractor() {
        #[get("/{payroll_data_id}")]
        async fn test_handler(data: RecalculablePayrollData) -> impl Responder {
            web::Json(data.0)
        }

        let employee_id = Uuid::new_v4();
        let calculated = payroll_data_fixture(employee_id, PayrollStatus::Calculated);
        let approved = payroll_data_fixture(employee_id, PayrollStatus::Approved);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ calculated.clone() ],
                vec![ approved.clone() ],
                vec![ ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db.into_connection()))
                .service(test_handler)
        ).await;

        let req = test::TestRequest::default()
            .uri(&format!("/{}", calculated.id))
            .to_request();

        let returned: payroll_data::Model = test::call_and_read_body_json(&app, req).await;
        assert_eq!(returned, calculated);

        let req = test::TestRequest::default()
            .uri(&format!("/{}", approved.id))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::default()
            .uri(&format!("/{}", Uuid::new_v4()))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::default()
            .uri("/not-a-uuid")
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
