use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::llm::GenerationError;
use crate::rag::RagError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("retrieval failed: {0}")]
    Retrieval(String),
    #[error("generation failed: {0}")]
    Generation(String),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "validation_error",
            ApiError::Retrieval(_) => "retrieval_error",
            ApiError::Generation(_) => "generation_error",
        }
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        ApiError::Retrieval(err.to_string())
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        ApiError::Generation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Retrieval(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Generation(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!("{} ({})", detail, self.kind());
        }

        let body = Json(json!({ "error": self.kind(), "detail": detail }));
        (status, body).into_response()
    }
}
