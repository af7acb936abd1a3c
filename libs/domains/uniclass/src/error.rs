use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniclassError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Match backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UniclassResult<T> = Result<T, UniclassError>;

impl From<reqwest::Error> for UniclassError {
    fn from(err: reqwest::Error) -> Self {
        UniclassError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for UniclassError {
    fn from(err: serde_json::Error) -> Self {
        UniclassError::Internal(format!("JSON error: {}", err))
    }
}

/// Convert UniclassError to AppError for standardized HTTP error responses
impl From<UniclassError> for AppError {
    fn from(err: UniclassError) -> Self {
        match err {
            UniclassError::Validation(msg) => AppError::BadRequest(msg),
            UniclassError::Embedding(msg) => {
                AppError::InternalServerError(format!("Embedding error: {}", msg))
            }
            UniclassError::Backend(msg) => {
                AppError::InternalServerError(format!("Match backend error: {}", msg))
            }
            UniclassError::Config(msg) => {
                AppError::InternalServerError(format!("Config error: {}", msg))
            }
            UniclassError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UniclassError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
