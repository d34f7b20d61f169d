use super::*;

impl FromRequest for payslip::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let payslip_id = req.match_info().get("payslip_id").expect("This extractor must be used under `payslip_id` path");
            let Ok(payslip_id) = Uuid::from_str(payslip_id) else {
                return Err(AppError::InvalidInput("invalid `payslip_id`".to_owned()).into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let payslip = Payslip::find_by_id(payslip_id)
                .one(db.as_ref()).await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::not_found("Payslip"))?;

            Ok(payslip)
        })
    }
}
