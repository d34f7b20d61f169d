use std::{env, net::{SocketAddr, ToSocketAddrs as _}};

use sea_orm::ConnectOptions;
use tracing::info;

use crate::payroll::RateBook;

pub struct Config {
    pub host_address: SocketAddr,

    pub database_opt: ConnectOptions,
    
    pub jwt_key: String,

    pub rate_book: RateBook,

    pub run_migrations: bool,
}

pub fn load() -> Config {
    Config {
        host_address: load_host_address(),
        database_opt: load_database_opt().into(),
        jwt_key: load_jwt_key(),
        rate_book: load_rate_book(),
        run_migrations: load_run_migrations(),
    }
}

fn load_host_address() -> SocketAddr {
    info!("Loading environment `HOST_ADDRESS`");

    let var = env::var("HOST_ADDRESS").unwrap_or_else(|_| "127.0.0.1:0".to_string());
    
    var.to_socket_addrs()
        .expect("`HOST_ADDRESS` is not in a valid format").nth(0)
        .expect("unable to resolve host from `HOST_ADDRESS`")
}

fn load_database_opt() -> impl Into<ConnectOptions> {
    info!("Loading environment `DATABASE_URL`");
    
    let var = env::var("DATABASE_URL").expect("Environment `DATABASE_URL` is required to be set");
    
    var
}

fn load_jwt_key() -> String {
    info!("Loading environment `JWT_SECRET`");

    let var = env::var("JWT_SECRET").expect("Environment `JWT_SECRET` is required to be set");
    
    var
}

fn load_rate_book() -> RateBook {
    info!("Loading environment `RATE_TABLES_PATH`");

    let Ok(path) = env::var("RATE_TABLES_PATH") else {
        info!("`RATE_TABLES_PATH` not set, using the built-in rate table");
        return RateBook::default()
    };

    let book = RateBook::load(&path)
        .unwrap_or_else(|err| panic!("unable to load rate tables from `{path}`: {err}"));

    for table in book.tables() {
        info!(version = %table.version, effective_from = %table.effective_from, "Loaded rate table");
    }

    book
}

fn load_run_migrations() -> bool {
    info!("Loading environment `RUN_MIGRATIONS`");

    env::var("RUN_MIGRATIONS")
        .map(|var| matches!(var.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
