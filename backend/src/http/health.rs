use crate::api_error::ApiError;
use crate::http::AppState;
use actix_web::{web, HttpResponse, Result};

pub async fn health_check(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    crate::db::health_check(&state.db_pool).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "database": "ok",
        "liveSessions": state.broadcaster.session_count()
    })))
}
