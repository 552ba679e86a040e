// src/db/pool.rs

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::config::Config;

/// Builds the shared connection pool. Stores only ever borrow from it.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database_url)
        .await
}

/// Connects with a bounded number of retries while the database comes up.
pub async fn connect_with_retry(config: &Config, attempts: u32) -> Result<PgPool, sqlx::Error> {
    let mut retry_count = 0;
    loop {
        match create_pool(config).await {
            Ok(pool) => return Ok(pool),
            Err(e) if retry_count < attempts => {
                retry_count += 1;
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {}): {}",
                    retry_count,
                    e
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Err(e) => return Err(e),
        }
    }
}
