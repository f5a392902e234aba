use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised by the matching core (vocabulary, corpus index, recommender).
#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    /// Skill source is missing, malformed, or empty. Fatal at startup.
    #[error("Vocabulary load error: {0}")]
    VocabularyLoad(String),

    /// No valid listings to index. Expected while the corpus is still being populated.
    #[error("Job corpus is empty")]
    EmptyCorpus,

    /// Caller contract violation (e.g. `top_n` of zero).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Match(MatchError::InvalidArgument(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg.clone())
            }
            AppError::Match(MatchError::EmptyCorpus) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_CORPUS",
                "No valid job listings were supplied".to_string(),
            ),
            AppError::Match(MatchError::VocabularyLoad(msg)) => {
                tracing::error!("Vocabulary error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "VOCABULARY_ERROR",
                    "The skill vocabulary is unavailable".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
