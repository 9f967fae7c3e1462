use crate::api_error::ApiError;
use crate::http::extractors::{decode_payload, match_id};
use crate::http::{AppState, DataResponse};
use crate::models::match_model::*;
use crate::validation::collect_issues;
use actix_web::{web, HttpResponse, Responder};
use tracing::info;
use validator::Validate;

/// GET /api/matches?limit=
/// Newest matches first
pub async fn list_matches(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<impl Responder, ApiError> {
    let query = query.into_inner();
    query
        .validate()
        .map_err(|errors| ApiError::invalid_query(collect_issues(&errors)))?;

    let matches = state
        .match_service
        .list_matches(query.effective_limit())
        .await?;

    Ok(HttpResponse::Ok().json(DataResponse::new(matches)))
}

/// POST /api/matches
/// Create a new match
pub async fn create_match(
    state: web::Data<AppState>,
    req: web::Json<serde_json::Value>,
) -> Result<impl Responder, ApiError> {
    let new_match = decode_payload::<CreateMatchDTO>(req.into_inner())?.into_new_match()?;

    info!(
        sport = %new_match.sport,
        home_team = %new_match.home_team,
        away_team = %new_match.away_team,
        "Received create match request"
    );

    let record = state.match_service.create_match(new_match).await?;

    Ok(HttpResponse::Created().json(DataResponse::new(record)))
}

/// GET /api/matches/{id}
/// Get a match with its status reconciled
pub async fn get_match(
    state: web::Data<AppState>,
    path: web::Path<MatchIdPath>,
) -> Result<impl Responder, ApiError> {
    let match_id = match_id(path)?;

    let record = state.match_service.get_match(match_id).await?;

    Ok(HttpResponse::Ok().json(DataResponse::new(record)))
}

/// PATCH /api/matches/{id}/score
/// Replace both scores
pub async fn update_score(
    state: web::Data<AppState>,
    path: web::Path<MatchIdPath>,
    req: web::Json<serde_json::Value>,
) -> Result<impl Responder, ApiError> {
    let match_id = match_id(path)?;
    let dto: UpdateScoreDTO = decode_payload(req.into_inner())?;
    dto.validate()
        .map_err(|errors| ApiError::invalid_payload(collect_issues(&errors)))?;

    let record = state.match_service.update_score(match_id, dto).await?;

    Ok(HttpResponse::Ok().json(DataResponse::new(record)))
}
