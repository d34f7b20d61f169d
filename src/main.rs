use std::fs::OpenOptions;

use actix_web::{web, App, HttpServer};
use migration::{Migrator, MigratorTrait as _};
use sea_orm::Database;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

use crate::auth::Authority;

mod config;
mod consts;
mod utils;

mod entity;
mod error;
mod auth;
mod payroll;
mod validation;
mod pages;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenvy::dotenv();
    
    let log_file = OpenOptions::new()
        .append(true)
        .create(true)
        .open("trace.log")?;
    
    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(true)
                .with_line_number(true)
                .with_filter(EnvFilter::from_default_env())
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(log_file)
                .with_filter(filter::LevelFilter::from_level(Level::TRACE))
        );
    
    tracing::subscriber::set_global_default(subscriber).expect("Unable to install the tracing subscriber");
    
    let config::Config {
        host_address,
        database_opt,
        jwt_key,
        rate_book,
        run_migrations,
    } = config::load();
    
    let connection = Database::connect(database_opt).await.expect("Unable to connect to database");

    if run_migrations {
        info!("Running pending migrations");
        Migrator::up(&connection, None).await.expect("Unable to run migrations");
    }

    let database = web::Data::new(connection);
    let authority = web::Data::new(Authority::new(jwt_key.as_bytes()));
    let rate_book = web::Data::new(rate_book);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(database.clone())
            .app_data(authority.clone())
            .app_data(rate_book.clone())
            .wrap(TracingLogger::default())
            .configure(pages::config)
    });
    
    info!(%host_address, "Starting server");

    server
        .bind(host_address)?
        .run().await
}
