use actix_web::web;
use serde::{Deserialize, Serialize};

use crate::{consts::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE}, error::AppError};

mod auth;
mod employee;
mod payroll_data;
mod payslip;
mod payslip_template;
mod salary_structure;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .app_data(web::JsonConfig::default()
            .error_handler(|err, _| AppError::InvalidInput(err.to_string()).into()))
        .app_data(web::QueryConfig::default()
            .error_handler(|err, _| AppError::InvalidInput(err.to_string()).into()))
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/employees")
            .configure(employee::config))
        .service(web::scope("/salary-structures")
            .configure(salary_structure::config))
        .service(web::scope("/payroll-data")
            .configure(payroll_data::config))
        .service(web::scope("/payslips")
            .configure(payslip::config))
        .service(web::scope("/payslip-templates")
            .configure(payslip_template::config));
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<u64>,
    pub(crate) limit: Option<u64>,
}

impl PageQuery {
    /// Zero-based page index and a page size clamped to the allowed range.
    pub(crate) fn resolve(&self) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1) - 1;
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        (page, limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Page<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total: u64,
    pub(crate) page: u64,
    pub(crate) limit: u64,
    pub(crate) total_pages: u64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, total: u64, (page, limit): (u64, u64)) -> Self {
        Self {
            items,
            total,
            page: page + 1,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

/// Rejects blank values in optional text filters and inputs.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use sea_orm::{DatabaseConnection, Transaction};

    use super::*;

    /// Takes the mock connection back once the app that shared it is dropped.
    pub(crate) fn transaction_log(db: web::Data<DatabaseConnection>) -> Vec<Transaction> {
        match Arc::try_unwrap(db.into_inner()) {
            Ok(db) => db.into_transaction_log(),
            Err(_) => panic!("the app must be dropped before reading the transaction log"),
        }
    }

    #[test]
    fn test_page_query() {
        assert_eq!(PageQuery { page: None, limit: None }.resolve(), (0, DEFAULT_PAGE_SIZE));
        assert_eq!(PageQuery { page: Some(0), limit: Some(0) }.resolve(), (0, 1));
        assert_eq!(PageQuery { page: Some(3), limit: Some(10_000) }.resolve(), (2, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_page() {
        let page = Page::new(vec![1, 2], 51, (1, 25));

        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
    }
}
