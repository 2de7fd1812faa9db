use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Lectures incomplete; carries progress counters for the client.
    #[error("Prerequisite not met: {viewed}/{total} lectures viewed")]
    PrerequisiteNotMet { viewed: i64, total: i64 },

    #[error("Attempt limit exceeded: {used} of {limit} attempts used")]
    AttemptLimitExceeded { used: i64, limit: i32 },

    /// Transition requested on an attempt that is not in a state accepting it.
    #[error("Invalid attempt state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            Error::PrerequisiteNotMet { viewed, total } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "prerequisite_not_met",
                    "message": "All lectures must be viewed before taking the completion quiz",
                    "lectures_viewed": viewed,
                    "lectures_total": total,
                }),
            ),
            Error::AttemptLimitExceeded { used, limit } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "attempt_limit_exceeded",
                    "message": "No attempts remaining for this quiz",
                    "attempts_used": used,
                    "attempt_limit": limit,
                }),
            ),
            Error::InvalidState(msg) => (
                StatusCode::CONFLICT,
                json!({ "error": "invalid_state", "message": msg }),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Reqwest(err) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": format!("External service error: {}", err) }),
            ),
            Error::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() })),
            Error::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "An unexpected error occurred" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
