use actix_web::{web, App, HttpServer};
use anyhow::Context;
use tokio::signal;
use tracing::{error, info};

use matchday_backend::config::Config;
use matchday_backend::db::{create_pool, run_migrations};
use matchday_backend::http::{configure_routes, AppState};
use matchday_backend::middleware::{cors_middleware, request_logger};
use matchday_backend::service::StatusSweeper;
use matchday_backend::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize telemetry
    init_telemetry(&config.server.rust_log);

    // Create database pool
    let db_pool = create_pool(&config)
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let state = web::Data::new(AppState::new(db_pool.clone()));

    let sweeper = config
        .status_sync
        .interval()
        .map(|period| StatusSweeper::new(state.match_service.clone(), period).spawn());

    info!(
        "Starting Matchday backend server on {}:{}",
        config.server.host, config.server.port
    );

    let cors_origins = config.server.cors_origins.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_middleware(&cors_origins))
            .wrap(request_logger())
            .configure(configure_routes)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run();

    // Graceful shutdown
    let server_handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    db_pool.close().await;
    info!("Server stopped");

    Ok(())
}
