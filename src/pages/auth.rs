use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{auth::{hash_password, Admin, Authority}, entity::{prelude::*, sea_orm_active_enums::RoleType, user}, error::{ensure_valid, AppError}, validation::Violation};

const MIN_PASSWORD_LEN: usize = 8;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(login)
        .service(whoami)
        .service(create_user);
}

#[derive(Debug, Serialize, Deserialize)]
struct Login {
    username: String,
    password: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LoginResponse {
    token: String,
    user: user::Model,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateUser {
    username: String,
    password: String,
    role: RoleType,
    employee_id: Option<Uuid>,
}

#[post("/login")]
async fn login(db: web::Data<DatabaseConnection>, authority: web::Data<Authority>, credentials: web::Json<Login>) -> Result<impl Responder, AppError> {
    let hashed_password = hash_password(&credentials.username, &credentials.password);

    let Some(user) = User::find()
        .filter(user::Column::Username.eq(&credentials.username))
        .filter(user::Column::Password.eq(hashed_password))
        .one(db.get_ref()).await?
    else {
        warn!(username = %credentials.username, "Rejected login");
        return Err(AppError::Forbidden("Invalid credentials".to_owned()));
    };

    let token = authority.issue_for(&user)?;

    Ok(web::Json(LoginResponse { token, user }))
}

#[get("")]
async fn whoami(user: user::Model) -> impl Responder {
    web::Json(user)
}

#[post("/users")]
async fn create_user(db: web::Data<DatabaseConnection>, admin: Admin, payload: web::Json<CreateUser>) -> Result<impl Responder, AppError> {
    let mut violations = Vec::new();

    if payload.username.trim().is_empty() {
        violations.push(Violation::new("username", "username must not be empty"));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(Violation::new("password", format!("password must be at least {MIN_PASSWORD_LEN} characters")));
    }

    ensure_valid(violations)?;

    if let Some(employee_id) = payload.employee_id {
        Employee::find_by_id(employee_id)
            .one(db.get_ref()).await?
            .ok_or_else(|| AppError::not_found("Employee"))?;
    }

    let username = payload.username.trim().to_owned();

    let model = user::ActiveModel {
        created_at: Set(Local::now().fixed_offset()),
        updated_at: Set(Local::now().fixed_offset()),
        password: Set(hash_password(&username, &payload.password)),
        username: Set(username),
        role: Set(payload.role),
        employee_id: Set(payload.employee_id),
        ..Default::default()
    };

    let user = User::insert(model)
        .exec_with_returning(db.get_ref()).await?;

    info!(user_id = %user.id, role = ?user.role, created_by = %admin.id, "Created user");

    Ok(HttpResponse::Created().json(user))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{Method, StatusCode}, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase};

    use crate::auth::tests::{bearer, user_with_role};

    use super::*;

    #[actix_web::test]
    async fn test_login() {
        let secret = b"secret";

        let user_password = "secret";
        let mut user = user_with_role(RoleType::Employee);
        user.password = hash_password(&user.username, user_password);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ ],
                vec![ user.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(login)
        ).await;

        {
            let forbidden_req = test::TestRequest::default()
                .uri("/login")
                .method(Method::POST)
                .set_json(Login {
                    username: "username".to_owned(),
                    password: "password".to_owned(),
                })
                .to_request();

            let response = test::call_service(&app, forbidden_req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        {
            let success_req = test::TestRequest::default()
                .uri("/login")
                .method(Method::POST)
                .set_json(Login {
                    username: user.username.clone(),
                    password: user_password.to_owned(),
                })
                .to_request();

            let response: LoginResponse = test::call_and_read_body_json(&app, success_req).await;
            assert_eq!(response.user.id, user.id);
            assert!(response.user.password.is_empty());

            let returned_user = Authority::new(secret).authorize(response.token).unwrap();
            assert_eq!(returned_user.id, user.id);
        }
    }

    #[actix_web::test]
    async fn test_create_user() {
        let secret = b"secret";

        let admin = user_with_role(RoleType::Admin);
        let created = user_with_role(RoleType::Hr);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ created.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(create_user)
        ).await;

        let payload = |password: &str| CreateUser {
            username: "payroll.hr".to_owned(),
            password: password.to_owned(),
            role: RoleType::Hr,
            employee_id: None,
        };

        {
            let req = test::TestRequest::post()
                .uri("/users")
                .insert_header(bearer(secret, &user_with_role(RoleType::Hr)))
                .set_json(payload("long-enough"))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        {
            let req = test::TestRequest::post()
                .uri("/users")
                .insert_header(bearer(secret, &admin))
                .set_json(payload("short"))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        {
            let req = test::TestRequest::post()
                .uri("/users")
                .insert_header(bearer(secret, &admin))
                .set_json(payload("long-enough"))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
    }
}
