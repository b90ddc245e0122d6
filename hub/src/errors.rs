use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Range error: {0}")]
    Range(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// HTTP status for this error kind: 400, 404 or 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::Range(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Internal(_) | Error::Json(_) | Error::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message rendered to API clients, without the kind prefix.
    pub fn client_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::Range(msg) | Error::NotFound(msg) => msg.clone(),
            Error::Json(e) => format!("Malformed request body: {}", e),
            _ => "Internal server error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
