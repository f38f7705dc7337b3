use crate::error::HttpAppError;
use crate::services::resolve::{ResolveService, NOT_FOUND_MESSAGE};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use qrdrop_core::models::{MediaInfoResponse, MediaNotFoundResponse};
use qrdrop_core::AppError;
use std::sync::Arc;

/// Resolve an identifier to signed media and code-image URLs.
///
/// A missing item is answered with `{file_id, exists: false, error}` and
/// 404 rather than the generic error body.
pub async fn get_media_info(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Response, HttpAppError> {
    match ResolveService::new(&state).resolve(&file_id).await {
        Ok(media) => Ok(Json(MediaInfoResponse {
            file_id: media.id,
            media_url: media.media_url,
            qrcode_url: media.qrcode_url,
            filename: media.filename,
            file_extension: media.extension,
            is_video: media.kind.is_video(),
            exists: true,
        })
        .into_response()),
        Err(AppError::NotFound(_)) => {
            tracing::info!(file_id = %file_id, "Media not found");
            Ok((
                StatusCode::NOT_FOUND,
                Json(MediaNotFoundResponse::new(file_id, NOT_FOUND_MESSAGE)),
            )
                .into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, file_id = %file_id, "Failed to resolve media");
            Err(e.into())
        }
    }
}
