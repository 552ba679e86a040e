// src/db/mod.rs

pub mod executor;
pub mod pool;

pub use executor::{AccessMode, Bind, QueryExecutor, Statement};
