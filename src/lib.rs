// src/lib.rs

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod stores;
pub mod utils;

pub use routes::create_router;

/// Migrations embedded at compile time; applied at startup and by the
/// integration tests.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
