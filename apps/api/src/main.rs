//! Pharmos API server entry point.

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use pharmos_api::{configure, ApiConfig, AppState};
use pharmos_db::Database;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pharmos=debug,sqlx=warn")),
        )
        .init();

    let config = ApiConfig::load().context("Failed to load configuration")?;

    if config.uses_dev_secret() {
        warn!("JWT_SECRET is not set; using the development secret");
    }

    info!(
        db = %config.db_path.display(),
        max_connections = config.db_max_connections,
        "Opening database"
    );
    let db = Database::new(config.db_config())
        .await
        .context("Failed to open database")?;

    let state = web::Data::new(AppState::new(db, &config));

    info!(host = %config.host, port = config.port, "Starting Pharmos API server");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
