use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::HeaderMap,
    Json,
};
use futures::StreamExt;
use qrdrop_core::models::UploadResponse;
use qrdrop_core::AppError;

use crate::error::HttpAppError;
use crate::services::ingest::IngestService;
use crate::state::AppState;
use crate::utils::upload::{multipart_error, request_origin};

/// Upload handler
///
/// Reads the multipart field named `file`, streams it through the ingestion
/// pipeline and answers with the item's links. Only the first `file` field
/// is ingested; other fields are skipped.
///
/// # Errors
/// - `AppError::InvalidInput` - no file, empty filename or disallowed extension (400)
/// - `AppError::PayloadTooLarge` - body exceeds `MAX_CONTENT_LENGTH` (413)
/// - `AppError::Storage` - token issuance, upload or signing failed (500)
/// - `AppError::Internal` - scratch I/O or code rendering failed (500)
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let origin = request_origin(&headers, state.config.base.public_base_url.as_deref());

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        tracing::debug!(filename = %filename, "Received upload");

        let body = Box::pin(field.map(|chunk| chunk.map_err(multipart_error)));
        let outcome = IngestService::new(&state)
            .ingest(&filename, &origin, body)
            .await?;

        return Ok(Json(UploadResponse {
            success: true,
            file_id: outcome.id,
            media_url: outcome.media_url,
            qrcode_url: outcome.qrcode_url,
            play_url: outcome.play_url,
            is_video: outcome.kind.is_video(),
            filename: outcome.filename,
            file_extension: outcome.extension,
            message: "File uploaded successfully, QR code generated".to_string(),
        }));
    }

    Err(AppError::InvalidInput("No file selected".to_string()).into())
}
