//! Extractor configs that report malformed requests in the same JSON shape
//! as validation failures.

use crate::api_error::ApiError;
use crate::models::MatchIdPath;
use crate::validation::{collect_issues, ValidationIssue};
use actix_web::web;
use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;
use validator::Validate;

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::invalid_payload(vec![ValidationIssue::new("", err.to_string())]).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::invalid_query(vec![ValidationIssue::new("", err.to_string())]).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        ApiError::invalid_match_id(vec![ValidationIssue::new("id", err.to_string())]).into()
    })
}

/// Decode a JSON body into `T`, reporting the offending field as the issue path.
///
/// Handlers extract `web::Json<serde_json::Value>` so syntax errors still go
/// through [`json_config`] while shape errors land here with a field path.
pub fn decode_payload<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_path_to_error::deserialize(body).map_err(|err| {
        let mut path: Vec<String> = err
            .path()
            .iter()
            .filter_map(|segment| match segment {
                Segment::Map { key } => Some(key.clone()),
                Segment::Seq { index } => Some(index.to_string()),
                _ => None,
            })
            .collect();

        let message = err.into_inner().to_string();
        let message = match missing_field(&message) {
            Some(field) => {
                path.push(field.to_string());
                format!("{field} is required")
            }
            None => message,
        };

        ApiError::invalid_payload(vec![ValidationIssue { path, message }])
    })
}

// serde reports absent fields on the enclosing struct, not on the field.
fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next())
}

/// Validate the `{id}` segment and return the match id.
pub fn match_id(path: web::Path<MatchIdPath>) -> Result<i32, ApiError> {
    let path = path.into_inner();
    path.validate()
        .map_err(|errors| ApiError::invalid_match_id(collect_issues(&errors)))?;
    Ok(path.id)
}
