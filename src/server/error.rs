//! API error type shared by all handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::llm::LlmError;
use crate::ocr::ExtractionError;
use crate::repository::DieselError;

/// Errors returned to HTTP clients as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    /// The AI answered with something we could not use.
    #[error("{0}")]
    BadGateway(String),

    #[error("Database error: {0}")]
    Database(#[from] DieselError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{} not found", what))
    }
}

impl From<LlmError> for ApiError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::EmptyInput => Self::BadRequest(e.to_string()),
            LlmError::InvalidOutput(_) => Self::BadGateway(e.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}

impl From<ExtractionError> for ApiError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::UnsupportedFileType(_) => Self::UnsupportedMediaType(e.to_string()),
            _ => Self::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Database(e) => {
                error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            other if status.is_server_error() => {
                error!("{}", other);
                other.to_string()
            }
            other => {
                warn!("{}: {}", status, other);
                other.to_string()
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuizError;

    #[test]
    fn test_llm_error_mapping() {
        assert_eq!(
            ApiError::from(LlmError::EmptyInput).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(LlmError::InvalidOutput(QuizError::NoValidQuestions)).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(LlmError::Connection("refused".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_extraction_error_mapping() {
        let err = ApiError::from(ExtractionError::UnsupportedFileType("application/zip".into()));
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
