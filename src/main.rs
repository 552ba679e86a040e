// src/main.rs

use std::net::SocketAddr;

use assessment_backend::{
    MIGRATOR, config::Config, db::pool::connect_with_retry, routes, state::AppState,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DB_CONNECT_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Loads .env itself
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let pool = connect_with_retry(&config, DB_CONNECT_ATTEMPTS)
        .await
        .inspect_err(|e| {
            tracing::error!(
                "Failed to connect to database after {} retries: {}",
                DB_CONNECT_ATTEMPTS,
                e
            )
        })?;
    tracing::info!("Database connected...");

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrations applied successfully.");

    let port = config.server_port;
    let app = routes::create_router(AppState::new(pool, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
