use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::response::ErrorDetail;
use crate::error::ReadError;

/// Failure of an HTTP request, rendered as `{"detail": ...}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Read(ReadError),
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Read(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Read(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Read(e) if e.is_client_error() => e.to_string(),
            ApiError::Read(e) => format!("Error processing image: {}", e),
            ApiError::Internal(msg) => format!("Error processing image: {}", msg),
        }
    }
}

impl From<ReadError> for ApiError {
    fn from(err: ReadError) -> Self {
        ApiError::Read(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorDetail { detail: self.detail() };
        (self.status_code(), Json(body)).into_response()
    }
}
