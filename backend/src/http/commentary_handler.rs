use crate::api_error::ApiError;
use crate::http::extractors::{decode_payload, match_id};
use crate::http::{AppState, DataResponse};
use crate::models::{CreateCommentaryDTO, ListQuery, MatchIdPath};
use crate::validation::collect_issues;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// GET /api/matches/{id}/commentary?limit=
pub async fn list_commentary(
    state: web::Data<AppState>,
    path: web::Path<MatchIdPath>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, ApiError> {
    let match_id = match_id(path)?;
    let query = query.into_inner();
    query
        .validate()
        .map_err(|errors| ApiError::invalid_query(collect_issues(&errors)))?;

    let entries = state
        .commentary_service
        .list_commentary(match_id, query.effective_limit())
        .await?;

    Ok(HttpResponse::Ok().json(DataResponse::new(entries)))
}

/// POST /api/matches/{id}/commentary
pub async fn create_commentary(
    state: web::Data<AppState>,
    path: web::Path<MatchIdPath>,
    req: web::Json<serde_json::Value>,
) -> Result<impl Responder, ApiError> {
    let match_id = match_id(path)?;
    let dto = decode_payload::<CreateCommentaryDTO>(req.into_inner())?.validated()?;

    let commentary = state
        .commentary_service
        .create_commentary(match_id, dto)
        .await?;

    Ok(HttpResponse::Created().json(DataResponse::new(commentary)))
}
