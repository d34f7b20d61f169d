use actix_web::{body, http::StatusCode, HttpResponse};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::{auth::AuthError, payroll::PayrollError, validation::Violation};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("validation failed")]
    Validation(Vec<Violation>),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    MissingConfiguration(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    DuplicateResource(String),

    #[error("{0}")]
    LockedResource(String),

    #[error("authority error")]
    Authority(#[from] AuthError),

    #[error("database error")]
    Database(DbErr),

    #[error("internal error")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn forbidden() -> Self {
        Self::Forbidden("Insufficient permissions".to_owned())
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInputError",
            AppError::Validation(_) => "ValidationError",
            AppError::InvalidTransition(_) => "InvalidTransitionError",
            AppError::MissingConfiguration(_) => "MissingConfigurationError",
            AppError::Unauthorized => "UnauthorizedError",
            AppError::Forbidden(_) | AppError::Authority(_) => "ForbiddenError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::DuplicateResource(_) => "DuplicateResourceError",
            AppError::LockedResource(_) => "LockedResourceError",
            AppError::Database(_) | AppError::Internal(_) => "InternalError",
        }
    }
}

/// Fails with every collected violation, if there are any.
pub fn ensure_valid(violations: Vec<Violation>) -> Result<(), AppError> {
    if violations.is_empty() {
        return Ok(());
    }

    Err(AppError::Validation(violations))
}

impl From<PayrollError> for AppError {
    fn from(err: PayrollError) -> Self {
        match err {
            PayrollError::InvalidInput(message) => AppError::InvalidInput(message),
            PayrollError::MissingConfiguration(message) => AppError::MissingConfiguration(message),
            PayrollError::LockedResource(message) => AppError::LockedResource(message),
            err @ PayrollError::InvalidTransition { .. } => AppError::InvalidTransition(err.to_string()),
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // A guarded update that matched nothing lost a race with another writer.
        if let DbErr::RecordNotUpdated = err {
            return AppError::LockedResource("Record was modified by another request".to_owned());
        }

        let constraint = err.sql_err();
        AppError::from_storage(err, constraint)
    }
}

impl AppError {
    /// Maps a driver error, already classified by constraint, into the API taxonomy.
    fn from_storage(err: DbErr, constraint: Option<SqlErr>) -> Self {
        match constraint {
            Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::DuplicateResource(format!("Resource already exists: {detail}")),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => AppError::InvalidInput(format!("Referenced record does not exist: {detail}")),
            _ => AppError::Database(err),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("malformed stored document: {err}"))
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    message: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<&'a [Violation]>,
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_)
            | AppError::Validation(_)
            | AppError::InvalidTransition(_)
            | AppError::MissingConfiguration(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::Authority(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateResource(_) | AppError::LockedResource(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        let status = self.status_code();

        // Server errors keep the raw cause in `error` for operators.
        let (message, error) = match self {
            AppError::Database(err) => {
                error!(error = %err, "database failure");
                ("Internal server error".to_owned(), err.to_string())
            }
            AppError::Internal(cause) => {
                error!(error = %cause, "internal failure");
                ("Internal server error".to_owned(), cause.clone())
            }
            other => (other.to_string(), other.code().to_owned()),
        };

        let violations = match self {
            AppError::Validation(violations) => Some(violations.as_slice()),
            _ => None,
        };

        HttpResponse::build(status).json(ErrorEnvelope {
            success: false,
            message,
            error,
            violations,
        })
    }
}
