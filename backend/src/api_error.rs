use crate::validation::ValidationIssue;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("{0}")]
    Internal(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn invalid_payload(issues: Vec<ValidationIssue>) -> Self {
        ApiError::Validation {
            message: "Invalid payload.".to_string(),
            issues,
        }
    }

    pub fn invalid_query(issues: Vec<ValidationIssue>) -> Self {
        ApiError::Validation {
            message: "Invalid query.".to_string(),
            issues,
        }
    }

    pub fn invalid_match_id(issues: Vec<ValidationIssue>) -> Self {
        ApiError::Validation {
            message: "Invalid match id.".to_string(),
            issues,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a [ValidationIssue]>,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (message, details) = match self {
            ApiError::Validation { message, issues } => (message.clone(), Some(issues.as_slice())),
            // Driver errors are logged where they happen, never echoed to clients.
            ApiError::DatabaseError(_) => ("Database error".to_string(), None),
            _ => (self.to_string(), None),
        };

        let error_response = ErrorResponse {
            error: message,
            code: status.as_u16(),
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}
