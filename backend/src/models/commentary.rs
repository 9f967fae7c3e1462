use crate::api_error::ApiError;
use crate::validation::{coerce_optional_int, collect_issues};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// One live-commentary event of a match (row of the `commentary` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Commentary {
    pub id: i32,
    pub match_id: i32,
    pub minute: Option<i32>,
    pub sequence: Option<i32>,
    pub period: Option<String>,
    pub event_type: String,
    pub actor: Option<String>,
    pub team: Option<String>,
    pub message: String,
    /// Free-form extras, e.g. pitch coordinates or assisting player.
    pub metadata: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// Create Commentary Request DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentaryDTO {
    #[serde(default, deserialize_with = "coerce_optional_int")]
    #[validate(range(min = 0, message = "minute must be non-negative"))]
    pub minute: Option<i32>,
    #[serde(default, deserialize_with = "coerce_optional_int")]
    #[validate(range(min = 0, message = "sequence must be non-negative"))]
    pub sequence: Option<i32>,
    #[validate(length(max = 50, message = "period must be at most 50 characters"))]
    pub period: Option<String>,
    #[validate(length(min = 1, max = 100, message = "eventType is required (max 100 characters)"))]
    pub event_type: String,
    #[validate(length(max = 150, message = "actor must be at most 150 characters"))]
    pub actor: Option<String>,
    #[validate(length(max = 100, message = "team must be at most 100 characters"))]
    pub team: Option<String>,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl CreateCommentaryDTO {
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate()
            .map_err(|errors| ApiError::invalid_payload(collect_issues(&errors)))?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_commentary_payload() {
        let dto: CreateCommentaryDTO = serde_json::from_value(json!({
            "eventType": "goal",
            "message": "What a strike from outside the box!"
        }))
        .unwrap();

        let dto = dto.validated().unwrap();
        assert_eq!(dto.event_type, "goal");
        assert!(dto.minute.is_none());
        assert!(dto.tags.is_none());
    }

    #[test]
    fn test_full_commentary_payload() {
        let dto: CreateCommentaryDTO = serde_json::from_value(json!({
            "minute": "45",
            "sequence": 12,
            "period": "H1",
            "eventType": "goal",
            "actor": "Player Nine",
            "team": "Team A",
            "message": "Header at the near post",
            "metadata": { "x": 0.23, "y": 0.75, "assistBy": "Player Seven" },
            "tags": ["goal", "highlight"]
        }))
        .unwrap();

        let dto = dto.validated().unwrap();
        assert_eq!(dto.minute, Some(45));
        assert_eq!(dto.metadata.unwrap()["assistBy"], "Player Seven");
        assert_eq!(dto.tags.unwrap(), vec!["goal", "highlight"]);
    }

    #[test]
    fn test_rejects_missing_or_empty_fields() {
        assert!(serde_json::from_value::<CreateCommentaryDTO>(json!({ "eventType": "foul" })).is_err());

        let empty: CreateCommentaryDTO = serde_json::from_value(json!({
            "eventType": "",
            "message": ""
        }))
        .unwrap();
        match empty.validated() {
            Err(ApiError::Validation { issues, .. }) => {
                let paths: Vec<_> = issues.iter().map(|i| i.path.join(".")).collect();
                assert_eq!(paths, vec!["eventType", "message"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_negative_minute() {
        let dto: CreateCommentaryDTO = serde_json::from_value(json!({
            "minute": -3,
            "eventType": "foul",
            "message": "Late tackle"
        }))
        .unwrap();
        assert!(dto.validated().is_err());
    }
}
