//! `/process-image` and `/health` handlers

use axum::extract::State;
use axum::Json;
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::errors::ApiError;
use super::response::{HealthResponse, ProcessImageResponse};
use super::AppState;
use crate::reader::MeterReader;

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

/// POST /process-image - Read the numbers on an uploaded photo
///
/// # Request
/// - multipart form with a `file` field; its content type must be `image/*`
///
/// # Response
/// - `status`: always "success"
/// - `detected_numbers`: standardized numeric strings
/// - `message`: "No numbers detected" when the list is empty, otherwise null
///
/// # Errors
/// - 400 Bad Request: not an image, undecodable bytes, missing or malformed upload
/// - 500 Internal Server Error: recognition failed
pub async fn process_image_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("process_image", %request_id);

    async move {
        let result = process_upload(state, multipart).await;
        match &result {
            Ok(response) => info!(numbers = response.detected_numbers.len(), "request complete"),
            Err(e) if e.status_code().is_client_error() => warn!("rejected upload: {}", e.detail()),
            Err(e) => error!("processing failed: {}", e.detail()),
        }
        result
    }
    .instrument(span)
    .await
}

async fn process_upload(
    state: AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ProcessImageResponse>, ApiError> {
    let mut multipart = multipart
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart upload: {}", e)))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        MeterReader::check_content_type(field.content_type())?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;

        info!(size_bytes = bytes.len(), "upload received");

        let reader = state.reader.clone();
        let reading = tokio::task::spawn_blocking(move || reader.read_bytes(&bytes))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))??;

        return Ok(Json(ProcessImageResponse::new(reading.numbers)));
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        language: state.reader.language().to_string(),
    })
}
