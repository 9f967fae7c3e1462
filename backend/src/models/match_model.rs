use crate::api_error::ApiError;
use crate::service::match_status::{IntoMatchTime, StatusRecord, TimeBoundary};
use crate::validation::{
    coerce_int, coerce_optional_int, collect_issues, validate_iso_timestamp, ValidationIssue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Default page size for list endpoints.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Upper bound for list endpoints.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Lifecycle status of a match, stored as the `match_status` Postgres enum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 3] = [
        MatchStatus::Scheduled,
        MatchStatus::Live,
        MatchStatus::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
        }
    }

    /// Finished matches never change status again on their own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MatchStatus::Finished)
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `matches` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i32,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub status: MatchStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub home_score: i32,
    pub away_score: i32,
    pub created_at: DateTime<Utc>,
}

impl StatusRecord for Match {
    type Start = DateTime<Utc>;
    type End = Option<DateTime<Utc>>;

    fn start_time(&self) -> &DateTime<Utc> {
        &self.start_time
    }

    fn end_time(&self) -> &Option<DateTime<Utc>> {
        &self.end_time
    }

    fn status(&self) -> MatchStatus {
        self.status
    }

    fn set_status(&mut self, status: MatchStatus) {
        self.status = status;
    }
}

/// Validated input for inserting a match.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub home_score: i32,
    pub away_score: i32,
}

// ===== API DTOs =====

/// Query string for list endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListQuery {
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
    }
}

/// `{id}` path segment for match routes.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct MatchIdPath {
    #[validate(range(min = 1, message = "id must be positive"))]
    pub id: i32,
}

/// Create Match Request DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatchDTO {
    #[validate(length(min = 1, max = 50, message = "sport is required (max 50 characters)"))]
    pub sport: String,
    #[validate(length(min = 1, max = 100, message = "homeTeam is required (max 100 characters)"))]
    pub home_team: String,
    #[validate(length(min = 1, max = 100, message = "awayTeam is required (max 100 characters)"))]
    pub away_team: String,
    #[validate(custom(
        function = "validate_iso_timestamp",
        message = "startTime must be a valid ISO date string"
    ))]
    pub start_time: String,
    #[validate(custom(
        function = "validate_iso_timestamp",
        message = "endTime must be a valid ISO date string"
    ))]
    pub end_time: String,
    #[serde(default, deserialize_with = "coerce_optional_int")]
    #[validate(range(min = 0, message = "homeScore must be non-negative"))]
    pub home_score: Option<i32>,
    #[serde(default, deserialize_with = "coerce_optional_int")]
    #[validate(range(min = 0, message = "awayScore must be non-negative"))]
    pub away_score: Option<i32>,
}

impl CreateMatchDTO {
    /// Run field rules plus the window check and produce an insertable match.
    pub fn into_new_match(self) -> Result<NewMatch, ApiError> {
        if let Err(errors) = self.validate() {
            return Err(ApiError::invalid_payload(collect_issues(&errors)));
        }

        let (start_time, end_time) = parse_window(&self.start_time, &self.end_time)?;

        if end_time <= start_time {
            return Err(ApiError::invalid_payload(vec![ValidationIssue::new(
                "endTime",
                "endTime must be chronologically after startTime",
            )]));
        }

        Ok(NewMatch {
            sport: self.sport,
            home_team: self.home_team,
            away_team: self.away_team,
            start_time,
            end_time,
            home_score: self.home_score.unwrap_or(0),
            away_score: self.away_score.unwrap_or(0),
        })
    }
}

/// Normalize both boundaries, reporting the one that fails.
fn parse_window(start: &str, end: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let boundary = |raw: &str, side: TimeBoundary| {
        raw.to_match_time().ok_or_else(|| {
            let field = match side {
                TimeBoundary::Start => "startTime",
                TimeBoundary::End => "endTime",
            };
            ApiError::invalid_payload(vec![ValidationIssue::new(
                field,
                format!("{field} must be a valid ISO date string"),
            )])
        })
    };

    Ok((
        boundary(start, TimeBoundary::Start)?,
        boundary(end, TimeBoundary::End)?,
    ))
}

/// Update Score Request DTO
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreDTO {
    #[serde(deserialize_with = "coerce_int")]
    #[validate(range(min = 0, message = "homeScore must be non-negative"))]
    pub home_score: i32,
    #[serde(deserialize_with = "coerce_int")]
    #[validate(range(min = 0, message = "awayScore must be non-negative"))]
    pub away_score: i32,
}
