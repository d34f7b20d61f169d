use super::*;

impl FromRequest for employee::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let employee_id = req.match_info().get("employee_id").expect("This extractor must be used under `employee_id` path");
            let Ok(employee_id) = Uuid::from_str(employee_id) else {
                return Err(AppError::InvalidInput("invalid `employee_id`".to_owned()).into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let employee = Employee::find_by_id(employee_id)
                .one(db.as_ref()).await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::not_found("Employee"))?;

            Ok(employee)
        })
    }
}
