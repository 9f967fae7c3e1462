//! One-shot walkthrough of create / read / update / delete against the
//! `matches` table. Uses the same configuration as the server and exits.

use anyhow::Context;
use chrono::{Duration, Utc};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use matchday_backend::config::Config;
use matchday_backend::db::{create_pool, DbPool};
use matchday_backend::models::{NewMatch, UpdateScoreDTO};
use matchday_backend::service::{MatchBroadcaster, MatchService};
use matchday_backend::telemetry::init_telemetry;

async fn run(db_pool: DbPool) -> anyhow::Result<()> {
    let service = MatchService::new(db_pool, Arc::new(MatchBroadcaster::new()));
    let kickoff = Utc::now() + Duration::hours(1);

    // CREATE
    let created = service
        .create_match(NewMatch {
            sport: "football".to_string(),
            home_team: "Demo Home".to_string(),
            away_team: "Demo Away".to_string(),
            start_time: kickoff,
            end_time: kickoff + Duration::minutes(105),
            home_score: 0,
            away_score: 0,
        })
        .await
        .context("create failed")?;
    info!(record = ?created, "CREATE: match inserted");

    // READ
    let found = service
        .get_match(created.id)
        .await
        .context("read failed")?;
    info!(record = ?found, "READ: match loaded");

    // UPDATE
    let updated = service
        .update_score(
            created.id,
            UpdateScoreDTO {
                home_score: 2,
                away_score: 1,
            },
        )
        .await
        .context("update failed")?;
    info!(record = ?updated, "UPDATE: score changed");

    // DELETE
    service
        .delete_match(created.id)
        .await
        .context("delete failed")?;
    info!(match_id = created.id, "DELETE: match removed");

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_telemetry(&config.server.rust_log);

    let db_pool = match create_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting CRUD walkthrough");
    let outcome = run(db_pool.clone()).await;

    // Always release connections, even after a failed step.
    db_pool.close().await;
    info!("Database pool closed");

    match outcome {
        Ok(()) => {
            info!("CRUD walkthrough finished without errors");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("CRUD walkthrough failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
