use anyhow::{Context, Result};
use order::{handler::AppRouter, state::AppState};
use shared::{
    config::{Config, ConnectionManager},
    utils::{Telemetry, init_logger},
};
use sqlx::{Pool, Postgres};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, state, telemetry) = setup().await.context("Failed to setup application")?;

    let port = config.port;
    let serve_result = AppRouter::serve(port, state).await;

    if let Err(e) = &serve_result {
        error!("Server terminated with error: {e}");
    }

    if let Err(e) = telemetry.shutdown().await {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Order service shutdown complete.");
    serve_result
}

async fn setup() -> Result<(Config, AppState, Telemetry)> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::new("order-service", config.otel_endpoint.clone());
    let logger_provider = telemetry.init_logger();
    let _tracer_provider = telemetry.init_tracer();

    init_logger(logger_provider, "order-service");

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("failed to migrate database")?;
    }

    let state = AppState::new(db_pool, &config)
        .await
        .context("Failed to create AppState")?;

    info!("✅ Application setup completed successfully.");
    Ok((config, state, telemetry))
}

pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;

    Ok(())
}
