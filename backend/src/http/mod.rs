pub mod commentary_handler;
pub mod extractors;
pub mod health;
pub mod match_handler;
pub mod match_ws_handler;

use crate::db::DbPool;
use crate::service::{CommentaryService, MatchBroadcaster, MatchService};
use actix_web::web;
use serde::Serialize;
use std::sync::Arc;

/// Application state shared by every handler
pub struct AppState {
    pub db_pool: DbPool,
    pub broadcaster: Arc<MatchBroadcaster>,
    pub match_service: Arc<MatchService>,
    pub commentary_service: Arc<CommentaryService>,
}

impl AppState {
    pub fn new(db_pool: DbPool) -> Self {
        let broadcaster = Arc::new(MatchBroadcaster::new());
        Self {
            match_service: Arc::new(MatchService::new(db_pool.clone(), broadcaster.clone())),
            commentary_service: Arc::new(CommentaryService::new(
                db_pool.clone(),
                broadcaster.clone(),
            )),
            broadcaster,
            db_pool,
        }
    }
}

/// `{ "data": ... }` envelope used by every successful response.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Configure all routes plus the extractor error handlers.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(extractors::json_config())
        .app_data(extractors::query_config())
        .app_data(extractors::path_config())
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/matches")
                        .route("", web::get().to(match_handler::list_matches))
                        .route("", web::post().to(match_handler::create_match))
                        .route("/{id}", web::get().to(match_handler::get_match))
                        .route("/{id}/score", web::patch().to(match_handler::update_score))
                        .route(
                            "/{id}/commentary",
                            web::get().to(commentary_handler::list_commentary),
                        )
                        .route(
                            "/{id}/commentary",
                            web::post().to(commentary_handler::create_commentary),
                        ),
                ),
        )
        .configure(match_ws_handler::configure_ws_routes);
}
