use super::*;

impl FromRequest for salary_structure::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let structure_id = req.match_info().get("structure_id").expect("This extractor must be used under `structure_id` path");
            let Ok(structure_id) = Uuid::from_str(structure_id) else {
                return Err(AppError::InvalidInput("invalid `structure_id`".to_owned()).into())
            };

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let structure = SalaryStructure::find_by_id(structure_id)
                .one(db.as_ref()).await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::not_found("Salary structure"))?;

            Ok(structure)
        })
    }
}
